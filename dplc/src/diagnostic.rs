use codesnake::{Block, CodeWidth, Label, LineIndex};
use dpl::{lexer::Span, CompileError};
use yansi::Paint;

fn make_block<'a>(
    idx: &'a LineIndex,
    span: Span,
    message: String,
) -> Option<Block<&'a str, String>> {
    Block::new(
        idx,
        [Label::new(span)
            .with_text(message.red().to_string())
            .with_style(|s| s.red().to_string())],
    )
}

/// Errors at the end of input have an empty span, point at the last visible
/// character instead.
fn visible(source: &str, span: Span) -> Option<Span> {
    if !span.is_empty() {
        return Some(span);
    }
    let before = source[..span.start].trim_end();
    let last = before.chars().next_back()?;
    Some(before.len() - last.len_utf8()..before.len())
}

/// Print `error` to stderr, with the offending source when it has a location.
pub fn report(name: &str, source: &str, error: &CompileError) {
    eprintln!("{} {error}", "error:".red().bold());

    let CompileError::Parse(error) = error else {
        return;
    };
    let Some(span) = visible(source, error.span()) else {
        return;
    };
    let idx = LineIndex::new(source);
    if let Some(block) = make_block(&idx, span, error.to_string()) {
        let block = block.map_code(|c| CodeWidth::new(c, c.len()));
        eprintln!("{}[{name}]", block.prologue());
        eprint!("{block}");
        eprintln!("{}", block.epilogue());
    }
}
