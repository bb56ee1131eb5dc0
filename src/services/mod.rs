pub mod decoder;
pub mod pdf_assembler;
pub mod url_template;

pub use decoder::decode_page;
pub use pdf_assembler::PdfAssembler;
pub use url_template::UrlTemplate;
