//! Markdown rendering.

use pulldown_cmark::{html, CowStr, Event, Options, Parser};

/// Parser options shared by every call site.
pub fn markdown_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH
}

/// Render Markdown source to an HTML fragment.
///
/// Identical input always yields byte-identical output.
pub fn to_html(source: &str) -> String {
    let parser = Parser::new_ext(source, markdown_options());

    let mut html_output = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut html_output, BlockSpacing::new(parser));

    html_output
}

/// Event adapter that inserts an empty line between top-level blocks.
///
/// `# a\nb` renders as `<h1>a</h1>\n\n<p>b</p>\n` instead of pulldown-cmark's
/// default single newline.
pub struct BlockSpacing<'a, I> {
    inner: I,
    depth: usize,
    seen_block: bool,
    pending: Option<Event<'a>>,
}

impl<'a, I> BlockSpacing<'a, I>
where
    I: Iterator<Item = Event<'a>>,
{
    /// Wrap an event stream.
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            depth: 0,
            seen_block: false,
            pending: None,
        }
    }
}

impl<'a, I> Iterator for BlockSpacing<'a, I>
where
    I: Iterator<Item = Event<'a>>,
{
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(event) = self.pending.take() {
            return Some(event);
        }

        let event = self.inner.next()?;
        let opens_block = self.depth == 0 && matches!(event, Event::Start(_) | Event::Rule);
        let separate = opens_block && self.seen_block;

        match &event {
            Event::Start(_) => self.depth += 1,
            Event::End(_) => {
                self.depth = self.depth.saturating_sub(1);
                if self.depth == 0 {
                    self.seen_block = true;
                }
            }
            Event::Rule if self.depth == 0 => self.seen_block = true,
            _ => {}
        }

        if separate {
            self.pending = Some(event);
            Some(Event::Html(CowStr::Borrowed("\n")))
        } else {
            Some(event)
        }
    }
}
