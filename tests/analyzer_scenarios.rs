use std::path::Path;

use pretty_assertions::assert_eq;

use watttrace::types::OperationKind::*;
use watttrace::{to_serializable, CarbonAnalyzer, Language, UNDETECTED_NOTE};

const S1_PY: &str = "def f():
    for i in range(10):
        print(i)
";

const S2_PY: &str = "N = 50
def g():
    for i in range(N):
        x = i + 1
";

const S3_PY: &str = "def h():
    for i in range(4):
        for j in range(5):
            print(j)
";

const S4_C: &str = "int main() {
    for (int i = 0; i < 3; i++) { printf(\"x\"); }
    return 0;
}
";

const S5_PY: &str = "def fib(n):
    if n < 2: return n
    return fib(n-1) + fib(n-2)
";

const JAVA_MAIN: &str = "public class Main {
    public static void main(String[] args) {
        for (int i = 0; i < 3; i++) { System.out.println(i); }
    }
}
";

const JS_GREET: &str = "function greet() {
    for (let i = 0; i < 3; i++) { console.log(i); }
}
";

const TS_TOTAL: &str = "function total(xs: number[]): number {
    let sum = 0;
    for (let i = 0; i < xs.length; i++) { sum += xs[i]; }
    return sum;
}
";

const CPP_STREAM: &str = "#include <iostream>
int show() {
    std::cout << \"hi\";
    return 0;
}
";

const C_FACT: &str = "int fact(int n) {
    if (n < 2) return 1;
    return n * fact(n - 1);
}
";

const PY_BUILDERS: &str = "def build():
    squares = [x * x for x in range(8)]
    table = {'a': 1, 'b': 2}
";

const PY_SORTED: &str = "def order(items):
    return sorted(items)
";

const PY_SIX: &str = "def a():
    pass
def b():
    print(1)
def c():
    print(1)
    print(2)
def d():
    print(1)
    print(2)
    print(3)
def e():
    print(1)
def f6():
    x = 1
";

#[test]
fn s1_single_loop_with_io() {
    let mut analyzer = CarbonAnalyzer::new();
    let result = analyzer.estimate(S1_PY, Some(Path::new("s1.py")), None);
    assert_eq!(result.language, Some(Language::Python));
    assert_eq!(result.functions.len(), 1);
    let f = &result.functions[0];
    assert_eq!(f.name, "f");
    assert_eq!(f.line, 1);
    assert_eq!(f.max_loop_nesting, 1);
    assert!(!f.is_recursive);
    assert_eq!(f.operations.get(IoOperation), 10);
    assert!(f.operations.get(Comparison) >= 10);
}

#[test]
fn s2_constant_propagation() {
    let mut analyzer = CarbonAnalyzer::new();
    let result = analyzer.estimate(S2_PY, Some(Path::new("s2.py")), None);
    let g = &result.functions[0];
    assert_eq!(g.name, "g");
    assert!(g.operations.get(Comparison) >= 50);
    assert_eq!(g.operations.get(Addition), 50);
    assert_eq!(g.operations.get(Assignment), 50);
    assert!(result
        .assumptions
        .iter()
        .any(|a| a.contains("for-loop resolved to 50 iterations")));
}

#[test]
fn s3_nested_loop_cascade() {
    let mut analyzer = CarbonAnalyzer::new();
    let result = analyzer.estimate(S3_PY, Some(Path::new("s3.py")), None);
    let h = &result.functions[0];
    assert_eq!(h.operations.get(IoOperation), 20);
    assert!(h.operations.get(Comparison) >= 24);
    assert_eq!(h.max_loop_nesting, 2);
}

#[test]
fn s4_brace_for_loop() {
    let mut analyzer = CarbonAnalyzer::new();
    let result = analyzer.estimate(S4_C, Some(Path::new("s4.c")), None);
    assert_eq!(result.language, Some(Language::C));
    assert_eq!(result.functions.len(), 1);
    let main = &result.functions[0];
    assert_eq!(main.name, "main");
    assert_eq!(main.operations.get(IoOperation), 3);
    assert!(main.operations.get(Comparison) >= 3);
    assert_eq!(main.max_loop_nesting, 1);
}

#[test]
fn s5_recursion_scaling() {
    let mut analyzer = CarbonAnalyzer::new();
    let result = analyzer.estimate(S5_PY, Some(Path::new("s5.py")), None);
    let fib = &result.functions[0];
    assert!(fib.is_recursive);
    assert!(fib.called_names.iter().any(|c| c == "fib"));
    let summary = fib.operations.summary();
    assert!(!summary.is_empty());
    for (_, count) in summary {
        assert_eq!(count % 10, 0);
    }
}

#[test]
fn s6_empty_and_undetectable() {
    let mut analyzer = CarbonAnalyzer::new();

    let with_path = analyzer.estimate("", Some(Path::new("empty.py")), None);
    assert_eq!(with_path.language, Some(Language::Python));
    assert!(with_path.functions.is_empty());
    assert_eq!(with_path.total_weighted_ops(), 0);
    assert!(with_path.assumptions.iter().all(|a| a != UNDETECTED_NOTE));

    let unknown = analyzer.estimate("", None, None);
    assert_eq!(unknown.language, None);
    assert!(unknown.functions.is_empty());
    assert_eq!(unknown.assumptions, vec![UNDETECTED_NOTE.to_string()]);
}

#[test]
fn fallback_parity_on_simple_scenarios() {
    let mut analyzer = CarbonAnalyzer::new();

    let tree = analyzer.estimate(S1_PY, Some(Path::new("s1.py")), None);
    let text = analyzer.estimate_sync(S1_PY, Some(Path::new("s1.py")), None);
    assert_eq!(
        tree.functions[0].operations.get(IoOperation),
        text.functions[0].operations.get(IoOperation)
    );
    assert_eq!(
        tree.functions[0].operations.get(Comparison),
        text.functions[0].operations.get(Comparison)
    );

    let tree = analyzer.estimate(S3_PY, Some(Path::new("s3.py")), None);
    let text = analyzer.estimate_sync(S3_PY, Some(Path::new("s3.py")), None);
    assert_eq!(
        tree.functions[0].operations.get(IoOperation),
        text.functions[0].operations.get(IoOperation)
    );

    let tree = analyzer.estimate(S4_C, Some(Path::new("s4.c")), None);
    let text = analyzer.estimate_sync(S4_C, Some(Path::new("s4.c")), None);
    assert_eq!(
        tree.functions[0].operations.get(IoOperation),
        text.functions[0].operations.get(IoOperation)
    );
    assert_eq!(
        tree.functions[0].operations.get(Comparison),
        text.functions[0].operations.get(Comparison)
    );
}

#[test]
fn java_method_qualification_and_io() {
    let mut analyzer = CarbonAnalyzer::new();
    let result = analyzer.estimate(JAVA_MAIN, Some(Path::new("Main.java")), None);
    assert_eq!(result.language, Some(Language::Java));
    assert_eq!(result.functions.len(), 1);
    let main = &result.functions[0];
    assert_eq!(main.name, "Main.main");
    assert_eq!(main.operations.get(IoOperation), 3);
    assert!(main.operations.get(Comparison) >= 3);
}

#[test]
fn javascript_console_io() {
    let mut analyzer = CarbonAnalyzer::new();
    let result = analyzer.estimate(JS_GREET, Some(Path::new("greet.js")), None);
    let greet = &result.functions[0];
    assert_eq!(greet.name, "greet");
    assert_eq!(greet.operations.get(IoOperation), 3);
    assert_eq!(greet.max_loop_nesting, 1);
}

#[test]
fn typescript_default_bound_and_subscript() {
    let mut analyzer = CarbonAnalyzer::new();
    let result = analyzer.estimate(TS_TOTAL, Some(Path::new("total.ts")), None);
    assert_eq!(result.language, Some(Language::TypeScript));
    let total = &result.functions[0];
    // `i < xs.length` cannot resolve, the default of 100 applies
    assert_eq!(total.operations.get(Comparison), 100);
    assert_eq!(total.operations.get(ArrayAccess), 100);
    assert!(total.operations.get(Assignment) >= 101);
}

#[test]
fn cpp_stream_insertion_is_io() {
    let mut analyzer = CarbonAnalyzer::new();
    let result = analyzer.estimate(CPP_STREAM, Some(Path::new("show.cpp")), None);
    assert_eq!(result.language, Some(Language::Cpp));
    let show = &result.functions[0];
    assert_eq!(show.operations.get(IoOperation), 1);
}

#[test]
fn c_recursion_scaling() {
    let mut analyzer = CarbonAnalyzer::new();
    let result = analyzer.estimate(C_FACT, Some(Path::new("fact.c")), None);
    let fact = &result.functions[0];
    assert!(fact.is_recursive);
    for (_, count) in fact.operations.summary() {
        assert_eq!(count % 10, 0);
    }
}

#[test]
fn comprehension_and_dict_literals() {
    let mut analyzer = CarbonAnalyzer::new();
    let result = analyzer.estimate(PY_BUILDERS, Some(Path::new("b.py")), None);
    let build = &result.functions[0];
    assert_eq!(build.operations.get(MemoryAllocation), 2);
    assert_eq!(build.operations.get(Multiplication), 8);
    assert_eq!(build.operations.get(Comparison), 8);
    // squares and table bindings plus one per dict pair
    assert_eq!(build.operations.get(Assignment), 4);
}

#[test]
fn sorted_uses_nlogn_heuristic() {
    let mut analyzer = CarbonAnalyzer::new();
    let result = analyzer.estimate(PY_SORTED, Some(Path::new("o.py")), None);
    let order = &result.functions[0];
    assert_eq!(order.operations.get(Comparison), 700);
    assert_eq!(order.operations.get(Assignment), 700);
}

#[test]
fn totals_are_global_plus_functions() {
    let mut analyzer = CarbonAnalyzer::new();
    let result = analyzer.estimate(S2_PY, Some(Path::new("s2.py")), None);
    // module-level N = 50 lands in the global counter
    assert_eq!(result.global_operations.get(Assignment), 1);
    let total = result.total_operations();
    assert_eq!(
        total.get(Assignment),
        result.global_operations.get(Assignment)
            + result.functions[0].operations.get(Assignment)
    );
}

#[test]
fn hotspots_ordering_and_length() {
    let mut analyzer = CarbonAnalyzer::new();
    let result = analyzer.estimate(PY_SIX, Some(Path::new("six.py")), None);
    assert_eq!(result.functions.len(), 6);
    let hot = result.hotspots();
    assert_eq!(hot.len(), 5);
    assert_eq!(hot[0].name, "d");
    assert_eq!(hot[1].name, "c");
    // b and e tie on weight, definition order breaks the tie
    assert_eq!(hot[2].name, "b");
    assert_eq!(hot[3].name, "e");
    assert_eq!(hot[4].name, "f6");
}

#[test]
fn tier_breakdown_total_is_sum() {
    let mut analyzer = CarbonAnalyzer::new();
    let result = analyzer.estimate(S3_PY, Some(Path::new("s3.py")), None);
    let b = result.breakdown();
    let sum = b.user_end.energy_joules + b.developer_end.energy_joules + b.server_side.energy_joules;
    assert!((b.total.energy_joules - sum).abs() <= 1e-9 * sum.max(1.0));
    assert!(b.total.carbon_grams >= 0.0);
}

#[test]
fn serialized_report_schema() {
    let mut analyzer = CarbonAnalyzer::new();
    let result = analyzer.estimate(S2_PY, Some(Path::new("s2.py")), None);
    let report = to_serializable(&result);
    assert_eq!(report.language, "python");
    assert_eq!(report.file_path.as_deref(), Some("s2.py"));
    assert_eq!(report.functions.len(), 1);
    assert_eq!(report.functions[0].name, "g");
    assert_eq!(report.functions[0].line, 2);
    assert!(report.total_operations.contains_key("comparison"));
    assert!(!report.total_operations.contains_key("network_operation"));

    let json = serde_json::to_value(&report).unwrap();
    assert!(json.get("energy_kWh").is_some());
    assert!(json.get("carbon_grams_CO2").is_some());
    assert!(json.get("hotspot_functions").is_some());

    // deterministic across calls on the same input
    let again = to_serializable(&analyzer.estimate(S2_PY, Some(Path::new("s2.py")), None));
    assert_eq!(report, again);
}

#[test]
fn language_override_wins() {
    let mut analyzer = CarbonAnalyzer::new();
    let result = analyzer.estimate(S1_PY, Some(Path::new("wrong.java")), Some(Language::Python));
    assert_eq!(result.language, Some(Language::Python));
    assert_eq!(result.functions[0].name, "f");
}

#[test]
fn dispose_and_reuse() {
    let mut analyzer = CarbonAnalyzer::new();
    analyzer.initialize(Path::new("/tmp/does-not-exist"));
    let first = analyzer.estimate(S1_PY, Some(Path::new("s1.py")), None);
    analyzer.dispose();
    let second = analyzer.estimate(S1_PY, Some(Path::new("s1.py")), None);
    assert_eq!(
        first.functions[0].operations.get(IoOperation),
        second.functions[0].operations.get(IoOperation)
    );
}
