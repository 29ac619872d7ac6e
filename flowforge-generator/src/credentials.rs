//! ABOUTME: Emits the credential-store stub: one typed field per credential input (§4.5 part 1)

use flowforge_core::Parameter;

use crate::writer::CodeWriter;

/// Render the `CredentialStore` struct and its `load_from_env` constructor.
/// Every field is a `String` loaded from the uppercased parameter name.
pub fn emit_credential_store(inputs: &[Parameter], out: &mut CodeWriter) {
    let credentials: Vec<&Parameter> = inputs.iter().filter(|p| p.is_credential).collect();

    out.line("#[derive(Debug, Clone, Default)]");
    out.line("pub struct CredentialStore {");
    out.indent();
    for p in &credentials {
        out.line(&format!("pub {}: String,", p.name));
    }
    out.dedent();
    out.line("}");
    out.line("");
    out.line("impl CredentialStore {");
    out.indent();
    out.line("/// Load every credential field from its uppercased environment variable.");
    out.line("pub fn load_from_env() -> Self {");
    out.indent();
    out.line("Self {");
    out.indent();
    for p in &credentials {
        out.line(&format!(
            "{}: std::env::var({:?}).unwrap_or_default(),",
            p.name,
            p.name.to_ascii_uppercase()
        ));
    }
    out.dedent();
    out.line("}");
    out.dedent();
    out.line("}");
    out.dedent();
    out.line("}");
}
