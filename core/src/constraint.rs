//! Build-context file selection for the indexer.
//!
//! A file belongs to the package only when its `_GOOS` / `_GOARCH` name
//! suffixes and its `//go:build` (or legacy `// +build`) header lines are
//! satisfied by the context. Generator files marked `ignore` never are.

use crate::config::IndexerConfig;

const KNOWN_OS: &[&str] = &[
    "aix",
    "android",
    "darwin",
    "dragonfly",
    "freebsd",
    "hurd",
    "illumos",
    "ios",
    "js",
    "linux",
    "nacl",
    "netbsd",
    "openbsd",
    "plan9",
    "solaris",
    "wasip1",
    "windows",
    "zos",
];

const KNOWN_ARCH: &[&str] = &[
    "386",
    "amd64",
    "amd64p32",
    "arm",
    "armbe",
    "arm64",
    "arm64be",
    "loong64",
    "mips",
    "mipsle",
    "mips64",
    "mips64le",
    "mips64p32",
    "mips64p32le",
    "ppc",
    "ppc64",
    "ppc64le",
    "riscv",
    "riscv64",
    "s390",
    "s390x",
    "sparc",
    "sparc64",
    "wasm",
];

/// Operating systems satisfying the `unix` tag.
const UNIX_OS: &[&str] = &[
    "aix",
    "android",
    "darwin",
    "dragonfly",
    "freebsd",
    "hurd",
    "illumos",
    "ios",
    "linux",
    "netbsd",
    "openbsd",
    "solaris",
];

/// Target platform and extra tags files are selected for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    goos: String,
    goarch: String,
    tags: Vec<String>,
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::host()
    }
}

impl BuildContext {
    pub fn new(goos: impl Into<String>, goarch: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            goos: goos.into(),
            goarch: goarch.into(),
            tags,
        }
    }

    /// The platform this process runs on, in Go's naming.
    pub fn host() -> Self {
        Self::new(host_os(), host_arch(), Vec::new())
    }

    /// Host platform overridden by `goos`, `goarch` and `build_tags`.
    pub fn from_config(config: &IndexerConfig) -> Self {
        let host = Self::host();
        Self::new(
            config.goos.clone().unwrap_or(host.goos),
            config.goarch.clone().unwrap_or(host.goarch),
            config.build_tags.clone(),
        )
    }

    pub fn goos(&self) -> &str {
        &self.goos
    }

    pub fn goarch(&self) -> &str {
        &self.goarch
    }

    /// Whether a single build tag holds. Release tags (`go1.N`) always do,
    /// since the indexed tree is assumed to match its own release.
    pub fn matches_tag(&self, tag: &str) -> bool {
        if tag == self.goos || tag == self.goarch || tag == "gc" {
            return true;
        }
        if self.tags.iter().any(|t| t == tag) {
            return true;
        }
        match tag {
            "linux" => self.goos == "android",
            "solaris" => self.goos == "illumos",
            "darwin" => self.goos == "ios",
            "unix" => UNIX_OS.contains(&self.goos.as_str()),
            _ => tag.strip_prefix("go1.").is_some_and(|minor| {
                !minor.is_empty() && minor.bytes().all(|b| b.is_ascii_digit())
            }),
        }
    }

    /// Check `_GOOS`, `_GOARCH` and `_GOOS_GOARCH` suffixes of a file name.
    /// A `_test` suffix is looked through. Everything before the first `_`
    /// is ignored, so `linux.go` is unconstrained.
    pub fn matches_file_name(&self, name: &str) -> bool {
        let stem = name.strip_suffix(".go").unwrap_or(name);
        let Some(first) = stem.find('_') else {
            return true;
        };
        let mut parts: Vec<&str> = stem[first..].split('_').collect();
        if parts.last() == Some(&"test") {
            parts.pop();
        }

        match parts.as_slice() {
            [.., os, arch] if KNOWN_OS.contains(os) && KNOWN_ARCH.contains(arch) => {
                self.matches_tag(os) && self.matches_tag(arch)
            }
            [.., last] if KNOWN_OS.contains(last) || KNOWN_ARCH.contains(last) => {
                self.matches_tag(last)
            }
            _ => true,
        }
    }

    /// Evaluate the constraint lines in the header of `source`, the comments
    /// and blank lines before the first line of code. A `//go:build` line wins
    /// over `// +build` lines; several `// +build` lines must all hold. A
    /// malformed `//go:build` expression excludes the file.
    pub fn matches_header(&self, source: &str) -> bool {
        let mut plus_build = Vec::new();
        let mut in_block = false;

        for line in source.lines() {
            let line = line.trim();
            if in_block {
                if let Some(end) = line.find("*/") {
                    in_block = false;
                    if !line[end + 2..].trim().is_empty() {
                        break;
                    }
                }
                continue;
            }
            if line.is_empty() {
                continue;
            }

            if let Some(comment) = line.strip_prefix("//") {
                if let Some(expr) = comment.strip_prefix("go:build") {
                    if expr.is_empty() || expr.starts_with(char::is_whitespace) {
                        return self.eval_expr(expr).unwrap_or(false);
                    }
                } else if let Some(args) = comment.trim_start().strip_prefix("+build") {
                    if args.is_empty() || args.starts_with(char::is_whitespace) {
                        plus_build.push(args);
                    }
                }
                continue;
            }

            if let Some(comment) = line.strip_prefix("/*") {
                match comment.find("*/") {
                    Some(end) if !comment[end + 2..].trim().is_empty() => break,
                    Some(_) => {}
                    None => in_block = true,
                }
                continue;
            }

            break;
        }

        plus_build.into_iter().all(|args| self.matches_plus_build(args))
    }

    /// `// +build` arguments: space-separated options, any of which may hold;
    /// each option is comma-separated terms that must all hold.
    fn matches_plus_build(&self, args: &str) -> bool {
        args.split_whitespace().any(|option| {
            option.split(',').all(|term| match term.strip_prefix('!') {
                Some(tag) => is_tag(tag) && !self.matches_tag(tag),
                None => is_tag(term) && self.matches_tag(term),
            })
        })
    }

    fn eval_expr(&self, expr: &str) -> Option<bool> {
        let tokens = tokenize(expr)?;
        let mut eval = ExprEval {
            context: self,
            tokens: &tokens,
            pos: 0,
        };
        let value = eval.or()?;
        (eval.pos == tokens.len()).then_some(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Tag(&'a str),
    Not,
    And,
    Or,
    Open,
    Close,
}

const fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

fn is_tag(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_tag_char)
}

fn tokenize(expr: &str) -> Option<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let mut rest = expr.trim_start();
    while let Some(c) = rest.chars().next() {
        let (token, len) = match c {
            '(' => (Token::Open, 1),
            ')' => (Token::Close, 1),
            '!' => (Token::Not, 1),
            '&' if rest.starts_with("&&") => (Token::And, 2),
            '|' if rest.starts_with("||") => (Token::Or, 2),
            c if is_tag_char(c) => {
                let len = rest.find(|c: char| !is_tag_char(c)).unwrap_or(rest.len());
                (Token::Tag(&rest[..len]), len)
            }
            _ => return None,
        };
        tokens.push(token);
        rest = rest[len..].trim_start();
    }
    Some(tokens)
}

/// Recursive descent over `||`, `&&`, `!` and parentheses, evaluating as it
/// parses. `None` means the expression is malformed.
struct ExprEval<'c, 't> {
    context: &'c BuildContext,
    tokens: &'t [Token<'t>],
    pos: usize,
}

impl<'t> ExprEval<'_, 't> {
    fn next(&mut self) -> Option<Token<'t>> {
        let token = self.tokens.get(self.pos).copied();
        self.pos += 1;
        token
    }

    fn eat(&mut self, token: Token<'t>) -> bool {
        if self.tokens.get(self.pos) == Some(&token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn or(&mut self) -> Option<bool> {
        let mut value = self.and()?;
        while self.eat(Token::Or) {
            let rhs = self.and()?;
            value = value || rhs;
        }
        Some(value)
    }

    fn and(&mut self) -> Option<bool> {
        let mut value = self.not()?;
        while self.eat(Token::And) {
            let rhs = self.not()?;
            value = value && rhs;
        }
        Some(value)
    }

    fn not(&mut self) -> Option<bool> {
        match self.next()? {
            Token::Not => self.not().map(|v| !v),
            Token::Open => {
                let value = self.or()?;
                self.eat(Token::Close).then_some(value)
            }
            Token::Tag(tag) => Some(self.context.matches_tag(tag)),
            Token::And | Token::Or | Token::Close => None,
        }
    }
}

fn host_os() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

fn host_arch() -> &'static str {
    let little = cfg!(target_endian = "little");
    match std::env::consts::ARCH {
        "x86" => "386",
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "loongarch64" => "loong64",
        "powerpc" => "ppc",
        "powerpc64" if little => "ppc64le",
        "powerpc64" => "ppc64",
        "mips" if little => "mipsle",
        "mips64" if little => "mips64le",
        "wasm32" => "wasm",
        other => other,
    }
}
