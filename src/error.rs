use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ForgeError {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config from {path}: {message}")]
    ConfigParse { path: String, message: String },

    #[error("failed to fetch catalog from {source_name}: {message}")]
    CatalogFetch {
        source_name: String,
        message: String,
    },

    #[error("failed to parse catalog: {message}")]
    CatalogParse { message: String },

    #[error("catalog is empty — no operating systems to select from")]
    #[diagnostic(help("check the service endpoint or pass --catalog with a known-good source"))]
    CatalogEmpty,

    #[error("unknown {kind} '{id}' in catalog")]
    CatalogLookup { kind: &'static str, id: String },

    #[error("{field} cannot be selected yet: {needed} must be selected first")]
    SelectionOrder {
        field: &'static str,
        needed: &'static str,
    },

    #[error("no operating system selected")]
    MissingOs,

    #[error("no image selected")]
    MissingImage,

    #[error("machine creation failed: {message}")]
    Creation { message: String },

    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("group store error at {path}: {message}")]
    GroupStore { path: String, message: String },

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_error_names_level_and_id() {
        let err = ForgeError::CatalogLookup {
            kind: "image",
            id: "win-11".into(),
        };
        assert_eq!(err.to_string(), "unknown image 'win-11' in catalog");
    }

    #[test]
    fn selection_order_error_names_both_fields() {
        let err = ForgeError::SelectionOrder {
            field: "platform",
            needed: "operating system",
        };
        assert!(err.to_string().contains("platform"));
        assert!(err.to_string().contains("operating system"));
    }
}
