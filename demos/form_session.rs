//! Form Session Demo
//!
//! Builds a small invoice form, edits it, and streams every page state to
//! the configured observer (default `ws://localhost:4000/ui-reflection`).
//!
//! Run with: `RUST_LOG=debug cargo run --example form_session`
//! Point it elsewhere with `UI_REFLECTION_URL=ws://host:port/path`.

use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;
use ui_reflection::{
    ComponentAction, ComponentDraft, ComponentKind, ComponentPatch, Field, FieldType, FieldValue,
    PageMeta, ReflectionSession, Scope, SelectOption, SyncConfig, SyncHandle,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = SyncConfig::default().with_env_overrides();
    let sync = SyncHandle::connect_websocket(config)?;

    let session = ReflectionSession::new(PageMeta::new(
        "manual-invoice",
        "Manual Invoice",
        "/billing/invoices/new",
    ));
    session.attach(&sync);

    let form = session.register(
        &Scope::root(),
        ComponentDraft::new(ComponentKind::Form).id("invoice-form").label("New invoice"),
    );
    let client = form.register_child(
        ComponentDraft::new(ComponentKind::FormField {
            field_type: FieldType::Select,
            value: FieldValue::default(),
            required: true,
            options: vec![
                SelectOption { value: "acme".into(), label: "Acme Corp".into() },
                SelectOption { value: "globex".into(), label: "Globex".into() },
            ],
        })
        .label("Client"),
    );
    let amount = form.register_child(ComponentDraft::new(ComponentKind::text_field()).label("Amount"));
    let submit = form.register_child(
        ComponentDraft::new(ComponentKind::button())
            .id("invoice-submit")
            .label("Create invoice")
            .disabled(true)
            .actions(vec![ComponentAction::Click]),
    );

    info!(components = session.len(), "form registered");
    tokio::time::sleep(Duration::from_secs(1)).await;

    client.update(ComponentPatch::value("acme"));
    amount.update(ComponentPatch::new().field(Field::Value("1250.00".into())));
    submit.update(ComponentPatch::new().disabled(false));
    info!(state = ?sync.state(), "form filled in");

    tokio::time::sleep(Duration::from_secs(6)).await;

    let page = session.page();
    println!("{}", serde_json::to_string_pretty(&page)?);

    form.unregister();
    info!(components = session.len(), "form unmounted");
    tokio::time::sleep(Duration::from_millis(200)).await;

    sync.shutdown();
    Ok(())
}
