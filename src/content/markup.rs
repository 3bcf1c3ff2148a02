/// Converts editor input into a markup fragment.
///
/// The pipeline never inspects the editor's representation; whatever
/// produces the fragment is injected through this trait. Closures work too.
pub trait MarkupConverter: Send + Sync {
    fn to_markup(&self, input: &str) -> String;
}

impl<F> MarkupConverter for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn to_markup(&self, input: &str) -> String {
        self(input)
    }
}

/// Plain text to paragraphs: blank lines split `<p>` blocks, single
/// newlines become `<br>`. All text is escaped.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParagraphConverter;

impl MarkupConverter for ParagraphConverter {
    fn to_markup(&self, input: &str) -> String {
        let normalized = input.replace("\r\n", "\n");
        normalized
            .split("\n\n")
            .map(str::trim)
            .filter(|block| !block.is_empty())
            .map(|block| {
                let lines: Vec<String> = block.lines().map(|l| tera::escape_html(l.trim())).collect();
                format!("<p>{}</p>", lines.join("<br>"))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
