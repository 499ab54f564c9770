use rivalbat_core::Result;
use rivalbat_indicator::IndicatorView;
use std::io::Write;

/// How views are written to the output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One JSON object per line (waybar / eww custom modules).
    #[default]
    Json,
    /// `text<TAB>tooltip` per line.
    Plain,
}

/// Writes indicator views, skipping ones identical to the last written.
pub struct Emitter<W: Write> {
    out:    W,
    format: OutputFormat,
    last:   Option<IndicatorView>,
}

impl<W: Write> Emitter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format, last: None }
    }

    /// Write `view` unless it matches the previous one.  Returns whether
    /// anything was written.
    pub fn emit(&mut self, view: IndicatorView) -> Result<bool> {
        if self.last.as_ref().is_some_and(|last| last.same_content(&view)) {
            return Ok(false);
        }

        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, &view).map_err(std::io::Error::from)?;
                writeln!(self.out)?;
            }
            OutputFormat::Plain => writeln!(self.out, "{}\t{}", view.text, view.tooltip)?,
        }
        self.out.flush()?;

        self.last = Some(view);
        Ok(true)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
