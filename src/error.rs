use thiserror::Error;

#[derive(Error, Debug)]
pub enum JacocovError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error at position {position}: {source}")]
    Xml {
        source: quick_xml::Error,
        position: usize,
    },

    #[error("XML parse error at position {position}: expected <{expected}> document, found <{found}>")]
    UnexpectedRoot {
        expected: &'static str,
        found: String,
        position: usize,
    },

    #[error("XML write error: {0}")]
    XmlWrite(#[source] quick_xml::Error),

    #[error("XML parse error at position {position}: <{element}> is missing required attribute '{attribute}'")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
        position: usize,
    },

    #[error("XML parse error at position {position}: <{element}> has invalid {attribute}=\"{value}\"")]
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
        position: usize,
    },

    #[error("Failed to get diff against {base}: {stderr}")]
    Git { base: String, stderr: String },

    #[error("Could not get coverage for {path}: {reason}")]
    Lookup { path: String, reason: String },
}

pub type Result<T> = std::result::Result<T, JacocovError>;
