pub mod renderer;

pub use renderer::PdfRenderer;
