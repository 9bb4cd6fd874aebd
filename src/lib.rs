pub mod dot_renderer;
pub mod er_ast;
pub mod er_parser;
pub mod error;

pub use dot_renderer::{Direction, RenderOptions};
pub use er_parser::{EdgeGrammar, IgnoredLine};
pub use error::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub edge_grammar: EdgeGrammar,
    pub direction: Direction,
    /// Fail instead of dropping lines that match no rule.
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Compilation {
    pub dot: String,
    pub ignored: Vec<IgnoredLine>,
}

/// Compiles ER notation to DOT with the default options.
///
/// Unrecognized lines are dropped, so this never fails.
pub fn compile(input: &str) -> String {
    let parsed = er_parser::parse_er(input, EdgeGrammar::default());
    dot_renderer::render(&parsed.diagram, &RenderOptions::default())
}

pub fn compile_with_options(input: &str, options: &CompileOptions) -> Result<Compilation, Error> {
    let parsed = er_parser::parse_er(input, options.edge_grammar);
    if options.strict {
        if let Some(first) = parsed.ignored.first() {
            return Err(Error::UnrecognizedLines {
                count: parsed.ignored.len(),
                line_number: first.line_number,
                text: first.text.clone(),
            });
        }
    }

    let render_options = RenderOptions {
        direction: options.direction,
    };
    let dot = dot_renderer::render(&parsed.diagram, &render_options);
    Ok(Compilation {
        dot,
        ignored: parsed.ignored,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_empty_input_emits_header_only() {
        let output = compile("");
        assert!(output.starts_with("digraph ER {\n"));
        assert!(output.ends_with("}\n"));
        assert!(!output.contains("shape="));
    }

    #[test]
    fn compile_with_default_options_matches_compile() {
        let input = "entity A\nrelationship R\nR A (1) TOTAL -- (N) PARTIAL B\n";
        let compiled = compile_with_options(input, &CompileOptions::default()).unwrap();
        assert_eq!(compiled.dot, compile(input));
        assert!(compiled.ignored.is_empty());
    }

    #[test]
    fn compile_reports_ignored_lines() {
        let compiled = compile_with_options("entity A\nfoo bar baz\n", &CompileOptions::default()).unwrap();
        assert_eq!(compiled.ignored.len(), 1);
        assert_eq!(compiled.ignored[0].line_number, 2);
    }

    #[test]
    fn compile_strict_rejects_unrecognized_line() {
        let options = CompileOptions {
            strict: true,
            ..CompileOptions::default()
        };
        let err = compile_with_options("entity A\nfoo bar baz\nqux\n", &options).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("2 unrecognized line(s)"), "got: {message}");
        assert!(message.contains("line 2"), "got: {message}");
        assert!(message.contains("foo bar baz"), "got: {message}");
    }

    #[test]
    fn compile_strict_accepts_clean_input() {
        let options = CompileOptions {
            strict: true,
            ..CompileOptions::default()
        };
        assert!(compile_with_options("# only a comment\nentity A\n", &options).is_ok());
    }

    #[test]
    fn compile_simplified_grammar_option() {
        let options = CompileOptions {
            edge_grammar: EdgeGrammar::Simplified,
            ..CompileOptions::default()
        };
        let compiled = compile_with_options("A (1) -- (N) B\n", &options).unwrap();
        assert!(compiled.dot.contains("\"A\" -> \"B\""));
        assert!(compiled.ignored.is_empty());
    }
}
