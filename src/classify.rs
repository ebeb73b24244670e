// Copyright (c) 2024-2025  Ministerio de Fomento
//                          Instituto de Ciencias de la Construcción Eduardo Torroja (IETcc-CSIC)

// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:

// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

// Author(s): Rafael Villar Burke <pachi@ietcc.csic.es>

/*!
Call classification
===================

Per-language sets of I/O, network and allocation call names. A call is
classified from its short name first and its full dotted path second, with
I/O taking precedence over network and network over allocation. Anything
unmatched is a plain function call.

The sets are the classification contract of the analyzer: extending them
changes reported footprints, so additions belong here and nowhere else.
*/

use crate::detect::Language;
use crate::types::OperationKind;

/// Cost class of a call expression
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CallClass {
    /// Input/output
    Io,
    /// Network traffic
    Network,
    /// Heap allocation
    Allocation,
    /// Ordinary call
    Plain,
}

impl CallClass {
    /// Operation kind this class is counted as
    pub fn operation(self) -> OperationKind {
        match self {
            CallClass::Io => OperationKind::IoOperation,
            CallClass::Network => OperationKind::NetworkOperation,
            CallClass::Allocation => OperationKind::MemoryAllocation,
            CallClass::Plain => OperationKind::FunctionCall,
        }
    }
}

/// Call-name sets of one language
struct ClassifierSets {
    io_names: &'static [&'static str],
    io_paths: &'static [&'static str],
    net_names: &'static [&'static str],
    net_paths: &'static [&'static str],
    alloc_names: &'static [&'static str],
    alloc_paths: &'static [&'static str],
}

const PYTHON_SETS: ClassifierSets = ClassifierSets {
    io_names: &[
        "print", "input", "open", "read", "write", "readline", "readlines", "writelines",
        "close", "flush",
    ],
    io_paths: &[
        "sys.stdout", "sys.stderr", "sys.stdin", "os.read", "os.write", "logging.", "shutil.",
        ".to_csv", ".read_csv", "pickle.",
    ],
    net_names: &["urlopen", "recv", "send", "sendall"],
    net_paths: &[
        "requests.", "urllib.", "socket.", "http.", "aiohttp.", "httpx.",
    ],
    alloc_names: &["list", "dict", "set", "tuple", "bytearray", "frozenset"],
    alloc_paths: &["numpy.array", "np.array", "np.zeros", "np.ones", "copy.deepcopy", "collections."],
};

const JAVA_SETS: ClassifierSets = ClassifierSets {
    io_names: &[
        "println", "print", "printf", "write", "read", "readLine", "readAllBytes", "flush",
        "close",
    ],
    io_paths: &[
        "System.out", "System.err", "System.in", "Files.", "FileReader", "FileWriter",
        "BufferedReader", "BufferedWriter", "Scanner.",
    ],
    net_names: &["connect", "openConnection", "openStream"],
    net_paths: &["HttpClient", "HttpURLConnection", "URLConnection", "Socket", "ServerSocket"],
    alloc_names: &["clone", "copyOf", "copyOfRange", "newInstance"],
    alloc_paths: &["Arrays.copyOf", "System.arraycopy", "Collections.nCopies"],
};

const C_SETS: ClassifierSets = ClassifierSets {
    io_names: &[
        "printf", "fprintf", "sprintf", "snprintf", "scanf", "fscanf", "sscanf", "puts",
        "fputs", "gets", "fgets", "getchar", "putchar", "fopen", "fclose", "fread", "fwrite",
        "fflush", "perror", "open", "close", "read", "write",
    ],
    io_paths: &["stdio.", "stderr", "stdout"],
    net_names: &[
        "socket", "connect", "bind", "listen", "accept", "send", "recv", "sendto", "recvfrom",
    ],
    net_paths: &["netinet.", "arpa.inet"],
    alloc_names: &["malloc", "calloc", "realloc", "free", "aligned_alloc", "strdup"],
    alloc_paths: &[],
};

const CPP_SETS: ClassifierSets = ClassifierSets {
    io_names: &[
        "printf", "fprintf", "scanf", "puts", "fgets", "getline", "fopen", "fclose", "fread",
        "fwrite", "open", "close", "read", "write", "flush",
    ],
    io_paths: &[
        "std::cout", "std::cerr", "std::cin", "std::clog", "std::ifstream", "std::ofstream",
        "std::fstream", "std::getline",
    ],
    net_names: &[
        "socket", "connect", "bind", "listen", "accept", "send", "recv", "sendto", "recvfrom",
    ],
    net_paths: &["boost::asio", "asio::", "curl_"],
    alloc_names: &[
        "malloc", "calloc", "realloc", "free", "make_unique", "make_shared", "reserve",
        "resize",
    ],
    alloc_paths: &["std::make_unique", "std::make_shared", "std::allocator"],
};

const JS_SETS: ClassifierSets = ClassifierSets {
    io_names: &[
        "alert", "prompt", "confirm", "readFileSync", "writeFileSync", "readFile", "writeFile",
        "appendFile", "createReadStream", "createWriteStream",
    ],
    io_paths: &["console.", "process.stdout", "process.stderr", "fs.", "document.write"],
    net_names: &["fetch"],
    net_paths: &[
        "axios.", "http.", "https.", "XMLHttpRequest", ".ajax", "WebSocket", "navigator.sendBeacon",
    ],
    alloc_names: &["Array", "Object", "Map", "Set", "WeakMap", "WeakSet", "Buffer"],
    alloc_paths: &["Array.from", "Array.of", "Object.assign", "Object.create", "Buffer."],
};

fn sets_for(lang: Language) -> &'static ClassifierSets {
    match lang {
        Language::Python => &PYTHON_SETS,
        Language::Java => &JAVA_SETS,
        Language::C => &C_SETS,
        Language::Cpp => &CPP_SETS,
        // typescript reuses the javascript sets
        Language::JavaScript | Language::TypeScript => &JS_SETS,
    }
}

/// Classify a call from its short name and its full dotted text.
///
/// Precedence per class is short name first, then dotted substring; classes
/// are tried in the order I/O, network, allocation.
pub fn classify(lang: Language, short_name: &str, dotted: &str) -> CallClass {
    let sets = sets_for(lang);
    if sets.io_names.contains(&short_name) || sets.io_paths.iter().any(|p| dotted.contains(p)) {
        return CallClass::Io;
    }
    if sets.net_names.contains(&short_name) || sets.net_paths.iter().any(|p| dotted.contains(p)) {
        return CallClass::Network;
    }
    if sets.alloc_names.contains(&short_name) || sets.alloc_paths.iter().any(|p| dotted.contains(p))
    {
        return CallClass::Allocation;
    }
    CallClass::Plain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_short_name_beats_everything() {
        // even under a network-looking dotted path the short name wins
        assert_eq!(
            classify(Language::Python, "print", "requests.print"),
            CallClass::Io
        );
        assert_eq!(classify(Language::C, "printf", "printf"), CallClass::Io);
    }

    #[test]
    fn dotted_paths_classify() {
        assert_eq!(
            classify(Language::Python, "get", "requests.get"),
            CallClass::Network
        );
        assert_eq!(
            classify(Language::JavaScript, "log", "console.log"),
            CallClass::Io
        );
        assert_eq!(
            classify(Language::Cpp, "make_pair", "std::make_unique<int>"),
            CallClass::Allocation
        );
    }

    #[test]
    fn typescript_reuses_javascript() {
        assert_eq!(classify(Language::TypeScript, "fetch", "fetch"), CallClass::Network);
        assert_eq!(
            classify(Language::TypeScript, "log", "console.log"),
            CallClass::Io
        );
    }

    #[test]
    fn unmatched_is_plain() {
        assert_eq!(
            classify(Language::Python, "compute", "helpers.compute"),
            CallClass::Plain
        );
        assert_eq!(classify(Language::Java, "toString", "x.toString"), CallClass::Plain);
    }

    #[test]
    fn allocation_names() {
        assert_eq!(classify(Language::C, "malloc", "malloc"), CallClass::Allocation);
        assert_eq!(classify(Language::Python, "list", "list"), CallClass::Allocation);
    }
}
