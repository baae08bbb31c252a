use mongodb::bson::{Bson, Document};

/// Render a server value as pretty relaxed extended JSON.
pub fn render_bson(value: Bson) -> String {
    let json = value.into_relaxed_extjson();
    serde_json::to_string_pretty(&json)
        .unwrap_or_else(|e| format!("<unprintable result: {}>", e))
}

pub fn render_documents(documents: &[Document]) -> String {
    render_bson(Bson::Array(
        documents.iter().cloned().map(Bson::Document).collect(),
    ))
}

pub fn print_documents(label: &str, documents: &[Document]) {
    println!("{}: {}", label, render_documents(documents));
}

pub fn print_document(label: &str, document: Option<&Document>) {
    let value = document.cloned().map(Bson::Document).unwrap_or(Bson::Null);
    println!("{}: {}", label, render_bson(value));
}

pub fn print_message(label: &str) {
    println!("{}", label);
}
