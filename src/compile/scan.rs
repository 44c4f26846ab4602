mod frame;

pub use frame::{Frame, LoopFrame};

use super::{
    emit,
    include::{self, resolve_include},
    tokenize::{Token, Tokenizer},
};
use crate::{
    loader::Loader,
    log::{Error, INCLUDE_CYCLE, INVALID_SYNTAX, UNBALANCED_BLOCK, UNMATCHED_DELIMITER},
    options::Options,
    region::Region,
    syntax::{Marker, Modifier},
};
use serde_json::Value;
use std::path::PathBuf;

/// The kind of content expected after the most recent marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Text,
    Execute,
    Literal,
    Escaped,
    Outputs,
    Comment,
    Circles,
    Process,
    Matches,
}

impl From<Marker> for Mode {
    fn from(marker: Marker) -> Self {
        match marker {
            Marker::BeginLiteral => Mode::Literal,
            Marker::BeginOutput => Mode::Outputs,
            Marker::BeginEscaped => Mode::Escaped,
            Marker::BeginComment => Mode::Comment,
            Marker::BeginCheck => Mode::Process,
            Marker::BeginShift => Mode::Matches,
            Marker::BeginLoop => Mode::Circles,
            Marker::Begin => Mode::Execute,
            Marker::Close | Marker::CloseTrim | Marker::CloseEqual => Mode::Text,
        }
    }
}

/// Walks the tokens of a template and writes the generated source for each
/// of them.
pub struct Scanner<'a> {
    text: &'a str,
    options: &'a Options,
    loader: &'a dyn Loader,
    /// Files currently being compiled, outermost first.
    chain: Vec<PathBuf>,
    mode: Mode,
    /// When true, one leading newline is removed from the next text.
    truncate: bool,
    line: usize,
    source: String,
    frames: Vec<Frame>,
    /// True between the opening of a switch and its first label, where
    /// nothing but labels may be written.
    switch_pending: bool,
}

impl<'a> Scanner<'a> {
    /// Create a new [`Scanner`] over the given template text.
    ///
    /// The chain holds the files which include this one, and is used to
    /// detect include cycles.
    pub fn new(
        text: &'a str,
        options: &'a Options,
        loader: &'a dyn Loader,
        chain: Vec<PathBuf>,
    ) -> Self {
        Self {
            text,
            options,
            loader,
            chain,
            mode: Mode::Text,
            truncate: false,
            line: 1,
            source: String::new(),
            frames: vec![],
            switch_pending: false,
        }
    }

    /// Scan the whole text and return the generated source.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when a begin marker is never closed, when block
    /// directives are not balanced, when an include cannot be compiled or
    /// when a directive cannot be understood.
    pub fn scan(mut self) -> Result<String, Error> {
        let text = self.text;
        let tokens = Tokenizer::new(self.options.delimiters()).tokenize(text);

        for (index, &(token, region)) in tokens.iter().enumerate() {
            match token {
                Token::Marker(marker) if marker.is_begin() => {
                    self.begin(marker);
                    if marker != Marker::BeginLiteral {
                        let is_close_at = |at: usize| {
                            tokens.get(at).is_some_and(|(token, _)| token.is_close())
                        };
                        if is_close_at(index + 1) {
                            self.dispatch("", region)?;
                        } else if !is_close_at(index + 2) {
                            return Err(Error::build(UNMATCHED_DELIMITER)
                                .with_pointer(text, region)
                                .with_help(format!(
                                    "could not find a matching close for `{}`",
                                    &text[region]
                                )));
                        }
                    }
                }
                Token::Marker(marker) => self.close(marker, &text[region]),
                Token::Text => self.dispatch(&text[region], region)?,
            }
            self.advance(&text[region]);
        }

        if let Some(frame) = self.frames.last() {
            return Err(Error::build(UNBALANCED_BLOCK)
                .with_pointer(text, frame.region())
                .with_help(format!("the {frame} opened here is never closed")));
        }

        Ok(self.source)
    }

    fn begin(&mut self, marker: Marker) {
        self.mode = Mode::from(marker);
        if marker == Marker::BeginLiteral {
            let begin = self.options.delimiters().begin().to_owned();
            self.write_literal(&begin);
        }
    }

    fn close(&mut self, marker: Marker, text: &str) {
        if self.mode == Mode::Literal {
            self.write_literal(text);
        }
        self.mode = Mode::Text;
        self.truncate = marker == Marker::CloseTrim;
    }

    /// Handle the content between markers according to the current mode.
    fn dispatch(&mut self, content: &str, region: Region) -> Result<(), Error> {
        match self.mode {
            Mode::Text | Mode::Literal => self.write_literal(content),
            Mode::Execute => match include::directive(content) {
                Some(path) => self.include(path, region)?,
                None => self.source.push_str(&emit::statement(content)),
            },
            Mode::Escaped => self.write_output(content, true),
            Mode::Outputs => self.write_output(content, false),
            Mode::Comment => {}
            Mode::Process => self.conditional(content, region)?,
            Mode::Matches => self.switch(content, region)?,
            Mode::Circles => self.circle(content, region)?,
        }

        Ok(())
    }

    /// Count the newlines of a token, and record the new line number in the
    /// generated source when debugging.
    fn advance(&mut self, token: &str) {
        let count = token.matches('\n').count();
        if count == 0 {
            return;
        }
        self.line += count;
        if self.options.debug() && !self.switch_pending {
            self.source.push_str(&format!("; __line = {}\n", self.line));
        }
    }

    fn write_literal(&mut self, text: &str) {
        let text = if self.truncate {
            self.truncate = false;
            strip_newline(text)
        } else {
            text
        };
        if text.is_empty() || self.switch_pending {
            return;
        }
        self.source.push_str(&emit::literal(text));
    }

    fn write_output(&mut self, content: &str, escaped: bool) {
        if let Some(statement) = emit::output(content, escaped) {
            self.source.push_str(&statement);
        }
    }

    /// Handle the content of a conditional directive.
    ///
    /// ```text
    /// <%? a %>      if (a) {
    /// <%? ?b %>     } else if (b) {
    /// <%? ? %>      } else {
    /// <%? %>        }
    /// ```
    fn conditional(&mut self, content: &str, region: Region) -> Result<(), Error> {
        let line = content.trim();
        let check = self.options.delimiters().modifier(Modifier::Check);

        if let Some(rest) = line.strip_prefix(check) {
            let condition = emit::strip_terminator(rest);
            match self.frames.last_mut() {
                Some(Frame::Branch { has_else: false, .. }) if !condition.is_empty() => {
                    self.source.push_str(&emit::branch_else(Some(condition)));
                }
                Some(Frame::Branch { has_else, .. }) if !*has_else => {
                    *has_else = true;
                    self.source.push_str(&emit::branch_else(None));
                }
                Some(Frame::Branch { .. }) => {
                    return Err(Error::build(UNBALANCED_BLOCK)
                        .with_pointer(self.text, region)
                        .with_help("a conditional may not continue after its unconditional alternative"));
                }
                _ => return Err(self.error_misplaced("alternative", "conditional", region)),
            }
        } else if line.is_empty() {
            match self.pop_frame(region)? {
                Frame::Branch { .. } => self.source.push_str("; }\n"),
                frame => return Err(self.error_mismatch("conditional", &frame, region)),
            }
        } else {
            self.frames.push(Frame::Branch {
                region,
                has_else: false,
            });
            self.source
                .push_str(&emit::branch_open(emit::strip_terminator(line)));
        }

        Ok(())
    }

    /// Handle the content of a switch directive.
    ///
    /// ```text
    /// <%: a %>      switch (a) {
    /// <%: :1, 2 %>  case (1): case (2):
    /// <%: : %>      default:
    /// <%: %>        }
    /// ```
    fn switch(&mut self, content: &str, region: Region) -> Result<(), Error> {
        let line = content.trim();
        let shift = self.options.delimiters().modifier(Modifier::Shift);

        if let Some(rest) = line.strip_prefix(shift) {
            if !matches!(self.frames.last(), Some(Frame::Switch { .. })) {
                return Err(self.error_misplaced("case", "switch", region));
            }
            let rest = rest.trim();
            let first = std::mem::take(&mut self.switch_pending);

            if rest.is_empty() {
                self.source.push_str(&emit::switch_default(first));
            } else {
                let values: Vec<Value> = serde_json::from_str(&format!("[{rest}]")).map_err(|e| {
                    Error::build(INVALID_SYNTAX)
                        .with_pointer(self.text, region)
                        .with_help(format!(
                            "case values must be a comma separated list of literals such as `1, \"a\"`, {e}"
                        ))
                })?;
                self.source.push_str(&emit::switch_case(&values, first));
            }
        } else if line.is_empty() {
            match self.pop_frame(region)? {
                Frame::Switch { .. } => {
                    let empty = std::mem::take(&mut self.switch_pending);
                    self.source.push_str(&emit::switch_close(empty));
                }
                frame => return Err(self.error_mismatch("switch", &frame, region)),
            }
        } else {
            self.frames.push(Frame::Switch { region });
            self.source.push_str(&emit::switch_open(emit::strip_terminator(line)));
            self.switch_pending = true;
        }

        Ok(())
    }

    /// Handle the content of a loop directive.
    ///
    /// ```text
    /// <%~ items <ul> %>   opens a loop over the list `items`
    /// <%~ ~user <dl> %>   opens a loop over the keys of the map `user`
    /// <%~ </ul> %>        closes the loop, the markup is optional
    /// ```
    fn circle(&mut self, content: &str, region: Region) -> Result<(), Error> {
        let trimmed = content.trim();

        if !trimmed.is_empty() && !trimmed.starts_with('<') {
            let (name, tag) = match trimmed.split_once(char::is_whitespace) {
                Some((name, tag)) => (name, tag.trim()),
                None => (trimmed, ""),
            };
            let loops = self.options.delimiters().modifier(Modifier::Loops);
            let (name, map) = match name.strip_prefix(loops) {
                Some(name) => (name, true),
                None => (name, false),
            };
            if name.is_empty() {
                return Err(Error::build(INVALID_SYNTAX)
                    .with_pointer(self.text, region)
                    .with_help("a loop must name the collection it iterates, such as `items`"));
            }

            let frame = LoopFrame {
                name: name.into(),
                tag: emit::escape_literal(tag),
                end: None,
                map,
                region,
            };
            self.source
                .push_str(&emit::loop_open(&frame, self.options.use_with()));
            self.frames.push(Frame::Loop(frame));
        } else {
            match self.pop_frame(region)? {
                Frame::Loop(mut frame) => {
                    if !trimmed.is_empty() {
                        frame.end = Some(emit::escape_literal(trimmed));
                    }
                    self.source
                        .push_str(&emit::loop_close(&frame, self.options.use_with()));
                }
                frame => return Err(self.error_mismatch("loop", &frame, region)),
            }
        }

        Ok(())
    }

    /// Compile the named file in place of the directive.
    fn include(&mut self, path: &str, region: Region) -> Result<(), Error> {
        let resolved = resolve_include(path, self.options.filename(), self.options.extension());
        if self.chain.contains(&resolved) {
            let trail: Vec<String> = self
                .chain
                .iter()
                .chain(std::iter::once(&resolved))
                .map(|path| path.display().to_string())
                .collect();

            return Err(Error::build(INCLUDE_CYCLE)
                .with_pointer(self.text, region)
                .with_help(trail.join(" -> ")));
        }

        tracing::debug!(path = %resolved.display(), "including template");
        let text = self.loader.read(&resolved, self.options.encoding());
        let options = self.options.clone().with_filename(&resolved);
        let mut chain = self.chain.clone();
        chain.push(resolved);

        let source = Scanner::new(&text, &options, self.loader, chain)
            .scan()
            .map_err(|e| e.or_name(options.name()))?;
        self.source.push_str(&include::splice(
            &source,
            &text,
            options.name().as_deref(),
            self.options.debug(),
        ));

        Ok(())
    }

    fn pop_frame(&mut self, region: Region) -> Result<Frame, Error> {
        self.frames.pop().ok_or_else(|| {
            Error::build(UNBALANCED_BLOCK)
                .with_pointer(self.text, region)
                .with_help("this closes a block that was never opened")
        })
    }

    fn error_mismatch(&self, directive: &str, frame: &Frame, region: Region) -> Error {
        Error::build(UNBALANCED_BLOCK)
            .with_pointer(self.text, region)
            .with_help(format!("this {directive} close would close the {frame} that is still open"))
    }

    fn error_misplaced(&self, directive: &str, block: &str, region: Region) -> Error {
        Error::build(UNBALANCED_BLOCK)
            .with_pointer(self.text, region)
            .with_help(format!("a {directive} must be placed directly inside a {block}"))
    }
}

/// Remove a single leading `\r\n`, `\r` or `\n`.
fn strip_newline(text: &str) -> &str {
    text.strip_prefix("\r\n")
        .or_else(|| text.strip_prefix('\r'))
        .or_else(|| text.strip_prefix('\n'))
        .unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::{strip_newline, Scanner};
    use crate::{
        loader::MemoryLoader,
        log::{INCLUDE_CYCLE, UNBALANCED_BLOCK, UNMATCHED_DELIMITER},
        options::Options,
    };

    fn scan(text: &str) -> Result<String, crate::log::Error> {
        let options = Options::new().with_debug(false).with_use_with(false);
        Scanner::new(text, &options, &MemoryLoader::new(), vec![]).scan()
    }

    #[test]
    fn test_strip_newline() {
        assert_eq!(strip_newline("\r\nx"), "x");
        assert_eq!(strip_newline("\n\nx"), "\nx");
        assert_eq!(strip_newline("\rx"), "x");
        assert_eq!(strip_newline("x"), "x");
    }

    #[test]
    fn test_text_and_outputs() {
        assert_eq!(
            scan("a<%= b %>c<%- d %>").unwrap(),
            "; __append(\"a\");\n; __append(b);\n; __append(\"c\");\n; __append(escape(d));\n"
        );
    }

    #[test]
    fn test_comment_and_empty_output() {
        assert_eq!(scan("<%# note %><%=%>").unwrap(), "");
    }

    #[test]
    fn test_literal_section() {
        assert_eq!(
            scan("<%% x %>").unwrap(),
            "; __append(\"<%\");\n; __append(\" x \");\n; __append(\"%>\");\n"
        );
    }

    #[test]
    fn test_trim_close() {
        assert_eq!(scan("<% a -%>\nb").unwrap(), ";  a \n; __append(\"b\");\n");
        assert_eq!(scan("<% a %>\nb").unwrap(), ";  a \n; __append(\"\\nb\");\n");
    }

    #[test]
    fn test_line_updates() {
        let options = Options::new().with_use_with(false);
        let source = Scanner::new("a\nb", &options, &MemoryLoader::new(), vec![])
            .scan()
            .unwrap();

        assert_eq!(source, "; __append(\"a\\nb\");\n; __line = 2\n");
    }

    #[test]
    fn test_conditional() {
        assert_eq!(
            scan("<%? a %>x<%? ?b %>y<%? ? %>z<%? %>").unwrap(),
            "; if (a) {\n; __append(\"x\");\n; } else if (b) {\n; __append(\"y\");\n; } else {\n; __append(\"z\");\n; }\n"
        );
    }

    #[test]
    fn test_switch() {
        let source = scan("<%: k %>\n<%: :1, \"a\" %>one<%: :2 %>two<%: : %>other<%: %>").unwrap();

        assert_eq!(
            source,
            "; switch (k) {\ncase (1):\ncase (\"a\"):\n; __append(\"one\");\n; break;\ncase (2):\n\
            ; __append(\"two\");\n; break;\ndefault:\n; __append(\"other\");\n; break;\n; }\n"
        );
    }

    #[test]
    fn test_switch_default_first() {
        assert_eq!(
            scan("<%: k %><%: : %>d<%: %>").unwrap(),
            "; switch (k) {\ndefault:\n; __append(\"d\");\n; break;\n; }\n"
        );
    }

    #[test]
    fn test_loop() {
        let source = scan("<%~ items <ul> %><%= $value %><%~ %>").unwrap();

        assert!(source.contains("; let $array = (items), $length = len($array), $index = 0, $value = null;\n"));
        assert!(source.contains("; if ($length) __append(\"<ul>\");\n"));
        assert!(source.contains("; for ($index, $value of $array) {\n"));
        assert!(source.contains("; if ($length) __append(\"</ul>\");\n"));
        assert!(!source.contains("with"));
    }

    #[test]
    fn test_map_loop_with_scope() {
        let options = Options::new().with_debug(false);
        let source = Scanner::new("<%~ ~user %><%~ </dl> %>", &options, &MemoryLoader::new(), vec![])
            .scan()
            .unwrap();

        assert!(source.contains("; for ($key, $value in $json) {\n; with ($value) {\n"));
        assert!(source.contains("; if ($length) __append(\"</dl>\");\n"));
    }

    #[test]
    fn test_unmatched_delimiter() {
        let error = scan("a <%= b").unwrap_err();
        assert_eq!(error.reason(), UNMATCHED_DELIMITER);
        assert!(error.help().unwrap().contains("<%="));
    }

    #[test]
    fn test_unbalanced_blocks() {
        assert_eq!(scan("<%? a %>").unwrap_err().reason(), UNBALANCED_BLOCK);
        assert_eq!(scan("<%? %>").unwrap_err().reason(), UNBALANCED_BLOCK);
        assert_eq!(scan("<%~ a %><%? %>").unwrap_err().reason(), UNBALANCED_BLOCK);
        assert_eq!(scan("<%? ?b %>").unwrap_err().reason(), UNBALANCED_BLOCK);
        assert_eq!(scan("<%: :1 %>").unwrap_err().reason(), UNBALANCED_BLOCK);
        assert_eq!(scan("<%~ %>").unwrap_err().reason(), UNBALANCED_BLOCK);
        assert_eq!(
            scan("<%? a %><%? ? %><%? ? %><%? %>").unwrap_err().reason(),
            UNBALANCED_BLOCK
        );
    }

    #[test]
    fn test_include() {
        let loader = MemoryLoader::new()
            .with_file("views/header.ejs", "<h1><%= title %></h1>")
            .with_file("views/partials/footer.ejs", "bye");
        let options = Options::new()
            .with_debug(false)
            .with_use_with(false)
            .with_filename("views/page.ejs");
        let source = Scanner::new(
            "<% include header %>body<% include partials/footer %>",
            &options,
            &loader,
            vec![],
        )
        .scan()
        .unwrap();

        assert_eq!(
            source,
            "; {\n; __append(\"<h1>\");\n; __append(title);\n; __append(\"</h1>\");\n; }\n\
            ; __append(\"body\");\n; {\n; __append(\"bye\");\n; }\n"
        );
    }

    #[test]
    fn test_include_cycle() {
        let loader = MemoryLoader::new()
            .with_file("a.ejs", "<% include b %>")
            .with_file("b.ejs", "<% include a %>");
        let options = Options::new().with_filename("a.ejs");
        let error = Scanner::new("<% include b %>", &options, &loader, vec!["a.ejs".into()])
            .scan()
            .unwrap_err();

        assert_eq!(error.reason(), INCLUDE_CYCLE);
        assert_eq!(error.get_name(), Some("b.ejs"));
    }
}
