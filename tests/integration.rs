//! End-to-end tests driving the dispatcher and rename engine over RAML
//! documents.

use std::path::Path;

use expect_test::expect;
use indoc::indoc;
use ramlsp::{
    load_settings, Dispatcher, Document, DocumentStore, RenameEngine, RenameError, Settings,
};
use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, Position, Url, WorkspaceEdit};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const CURSOR: char = '|';

fn api_uri() -> Url {
    Url::parse("file:///workspace/api.raml").unwrap()
}

/// Split a fixture into its text and the byte offset of the `|` marker.
fn cursor(marked: &str) -> (String, usize) {
    let offset = marked.find(CURSOR).expect("fixture has no cursor marker");
    let mut text = marked.to_string();
    text.remove(offset);
    (text, offset)
}

/// Rename the declaration under the cursor and return the rewritten text,
/// or a short description when nothing was changed.
fn rename_at(marked: &str, new_name: &str) -> String {
    let (text, offset) = cursor(marked);
    let document = Document::new(api_uri(), text, 1);

    match RenameEngine::new().rename(&document, offset, new_name) {
        Ok(changed) if changed.is_empty() => "<no changes>".to_string(),
        Ok(mut changed) => {
            assert_eq!(changed.len(), 1, "rename touched more than one document");
            changed.remove(0).text
        }
        Err(e) => format!("<error: {e}>"),
    }
}

fn open(documents: &DocumentStore, text: &str) -> Url {
    let uri = api_uri();
    documents.open(uri.clone(), text.to_string(), 1);
    uri
}

fn format_range(range: &tower_lsp::lsp_types::Range) -> String {
    format!(
        "{}:{}-{}:{}",
        range.start.line, range.start.character, range.end.line, range.end.character
    )
}

/// Render the edits of a workspace edit one per line, in the order a client
/// receives them.
fn format_workspace_edit(edit: &WorkspaceEdit) -> String {
    let Some(changes) = &edit.changes else {
        return "<no changes>".to_string();
    };
    if changes.is_empty() {
        return "<no changes>".to_string();
    }

    let mut lines = Vec::new();
    for (uri, edits) in changes {
        for edit in edits {
            lines.push(format!(
                "{} {} {:?}",
                uri.path(),
                format_range(&edit.range),
                edit.new_text
            ));
        }
    }
    lines.join("\n")
}

/// Format diagnostics into a stable, readable string for snapshot testing.
fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    if diagnostics.is_empty() {
        return "OK (no diagnostics)".to_string();
    }
    let mut lines: Vec<String> = diagnostics
        .iter()
        .map(|d| {
            let severity = match d.severity {
                Some(DiagnosticSeverity::ERROR) => "error",
                Some(DiagnosticSeverity::WARNING) => "warning",
                _ => "other",
            };
            format!("{} {}: {}", format_range(&d.range), severity, d.message)
        })
        .collect();
    lines.sort();
    lines.join("\n")
}

fn validate(dispatcher: &Dispatcher, text: &str) -> String {
    let documents = DocumentStore::new();
    let uri = open(&documents, text);

    let reports = dispatcher.validate(&documents, &uri);
    let diagnostics: Vec<Diagnostic> = reports
        .into_iter()
        .flat_map(|(report_uri, diagnostics)| {
            assert_eq!(report_uri, uri);
            diagnostics
        })
        .collect();
    format_diagnostics(&diagnostics)
}

// ---------------------------------------------------------------------------
// Tests: rename from a declaration key
// ---------------------------------------------------------------------------

#[test]
fn key_rename_updates_value_reference() {
    let actual = rename_at(
        indoc! {"
            types:
              fo|o: object
              Holder:
                properties:
                  target: foo
        "},
        "bar",
    );
    let expected = expect![[r#"
        types:
          bar: object
          Holder:
            properties:
              target: bar
    "#]];
    expected.assert_eq(&actual);
}

#[test]
fn edits_do_not_drift_when_the_name_grows() {
    let actual = rename_at(
        indoc! {"
            types:
              It|em: object
              Pair:
                properties:
                  left: Item
                  right: Item[]
        "},
        "LongerName",
    );
    let expected = expect![[r#"
        types:
          LongerName: object
          Pair:
            properties:
              left: LongerName
              right: LongerName[]
    "#]];
    expected.assert_eq(&actual);
}

#[test]
fn annotation_usages_keep_their_parentheses() {
    let actual = rename_at(
        indoc! {"
            annotationTypes:
              aud|it:
                properties:
                  level: string
            /orders:
              (audit):
                level: high
              get:
                (audit):
        "},
        "tracked",
    );
    let expected = expect![[r#"
        annotationTypes:
          tracked:
            properties:
              level: string
        /orders:
          (tracked):
            level: high
          get:
            (tracked):
    "#]];
    expected.assert_eq(&actual);
}

#[test]
fn sequence_key_renames_trait_everywhere() {
    let actual = rename_at(
        indoc! {"
            traits:
              paged:
                queryParameters:
                  page: integer
            /items:
              is: [paged]
              get:
                is:
                  - pa|ged:
                      page: 2
        "},
        "pageable",
    );
    let expected = expect![[r#"
        traits:
          pageable:
            queryParameters:
              page: integer
        /items:
          is: [pageable]
          get:
            is:
              - pageable:
                  page: 2
    "#]];
    expected.assert_eq(&actual);
}

#[test]
fn only_the_first_occurrence_in_a_value_is_rewritten() {
    // The union mentions a longer name first; the rewrite hits that prefix.
    let actual = rename_at(
        indoc! {"
            types:
              F|oo: object
              FooBar: object
              Either:
                type: FooBar | Foo
        "},
        "Baz",
    );
    let expected = expect![[r#"
        types:
          Baz: object
          FooBar: object
          Either:
            type: BazBar | Foo
    "#]];
    expected.assert_eq(&actual);
}

#[test]
fn parameterized_usages_in_flow_form_are_renamed() {
    let actual = rename_at(
        indoc! {"
            resourceTypes:
              coll|ection: {}
            traits:
              paged: {}
            /users:
              type: { collection: { item: User } }
              is: [ paged: { size: 10 } ]
        "},
        "items",
    );
    let expected = expect![[r#"
        resourceTypes:
          items: {}
        traits:
          paged: {}
        /users:
          type: { items: { item: User } }
          is: [ paged: { size: 10 } ]
    "#]];
    expected.assert_eq(&actual);

    let actual = rename_at(
        indoc! {"
            traits:
              paged: {}
            /users:
              is: [ pa|ged: { size: 10 }, paged ]
        "},
        "pageable",
    );
    let expected = expect![[r#"
        traits:
          pageable: {}
        /users:
          is: [ pageable: { size: 10 }, pageable ]
    "#]];
    expected.assert_eq(&actual);
}

// ---------------------------------------------------------------------------
// Tests: rename from a reference
// ---------------------------------------------------------------------------

#[test]
fn value_rename_updates_declaration_and_usages() {
    let actual = rename_at(
        indoc! {"
            types:
              User: object
              Admin:
                type: Us|er
              Guest:
                type: User
        "},
        "Person",
    );
    let expected = expect![[r#"
        types:
          Person: object
          Admin:
            type: Person
          Guest:
            type: Person
    "#]];
    expected.assert_eq(&actual);
}

#[test]
fn rename_to_the_same_name_leaves_text_unchanged() {
    let marked = indoc! {"
        types:
          User: object
          Admin:
            type: Us|er
    "};
    let (text, _) = cursor(marked);
    assert_eq!(rename_at(marked, "User"), text);
}

#[test]
fn inapplicable_positions_produce_no_changes() {
    let fixtures = [
        "#%RAML 1|.0\ntitle: Orders\n",
        "title: Or|ders\n",
        "# comment about Us|er\ntypes:\n  User: object\n",
        "types:\n  User: object\n  Admin:\n    type: Us|er[]\n",
        "/us|ers:\n  get:\n",
    ];
    for marked in fixtures {
        assert_eq!(rename_at(marked, "Other"), "<no changes>", "fixture: {marked:?}");
    }
}

#[test]
fn invalid_names_are_rejected() {
    let marked = indoc! {"
        types:
          Us|er: object
          Admin: User
    "};
    expect![[r#"<error: New name must not be empty>"#]].assert_eq(&rename_at(marked, ""));
    expect![[r#"<error: A type named 'Admin' already exists>"#]]
        .assert_eq(&rename_at(marked, "Admin"));
}

// ---------------------------------------------------------------------------
// Tests: dispatcher
// ---------------------------------------------------------------------------

#[test]
fn dispatcher_rename_produces_workspace_edit() {
    let documents = DocumentStore::new();
    let uri = open(
        &documents,
        indoc! {"
            types:
              User: object
              Admin:
                type: User
        "},
    );
    let dispatcher = Dispatcher::from_settings(&Settings::default());

    let edit = dispatcher
        .rename(&documents, &uri, Position::new(3, 12), "Person")
        .unwrap();
    let expected = expect![[r#"
        /workspace/api.raml 3:10-3:14 "Person"
        /workspace/api.raml 1:2-1:6 "Person""#]];
    expected.assert_eq(&format_workspace_edit(&edit));
}

#[test]
fn dispatcher_prepare_rename_reports_the_token() {
    let documents = DocumentStore::new();
    let uri = open(&documents, "types:\n  User: object\n  Admin:\n    type: User\n");
    let dispatcher = Dispatcher::from_settings(&Settings::default());

    let range = dispatcher
        .prepare_rename(&documents, &uri, Position::new(3, 12))
        .unwrap();
    assert_eq!(format_range(&range), "3:10-3:14");
    assert!(dispatcher
        .prepare_rename(&documents, &uri, Position::new(0, 2))
        .is_none());
}

#[test]
fn dispatcher_rename_error_is_propagated() {
    let documents = DocumentStore::new();
    let uri = open(&documents, "types:\n  User: object\n");
    let dispatcher = Dispatcher::from_settings(&Settings::default());

    let result = dispatcher.rename(&documents, &uri, Position::new(1, 3), "");
    assert_eq!(result, Err(RenameError::EmptyName));
}

#[test]
fn unknown_document_yields_empty_results() {
    let documents = DocumentStore::new();
    let uri = Url::parse("file:///workspace/missing.raml").unwrap();
    let dispatcher = Dispatcher::from_settings(&Settings::default());
    let position = Position::new(0, 0);

    assert!(dispatcher.symbols(&documents, &uri).is_empty());
    assert!(dispatcher.completion(&documents, &uri, position).is_empty());
    assert!(dispatcher.definition(&documents, &uri, position).is_empty());
    assert!(dispatcher.references(&documents, &uri, position).is_empty());
    assert!(dispatcher.highlight(&documents, &uri, position).is_empty());
    assert!(dispatcher.validate(&documents, &uri).is_empty());
    let edit = dispatcher.rename(&documents, &uri, position, "x").unwrap();
    assert_eq!(format_workspace_edit(&edit), "<no changes>");
}

#[test]
fn navigation_follows_references() {
    let documents = DocumentStore::new();
    let uri = open(
        &documents,
        indoc! {"
            types:
              User: object
              Admin:
                type: User
        "},
    );
    let dispatcher = Dispatcher::from_settings(&Settings::default());

    let definition = dispatcher.definition(&documents, &uri, Position::new(3, 11));
    assert_eq!(definition.len(), 1);
    assert_eq!(format_range(&definition[0].range), "1:2-1:6");

    let references = dispatcher.references(&documents, &uri, Position::new(1, 3));
    let ranges: Vec<String> = references.iter().map(|l| format_range(&l.range)).collect();
    assert_eq!(ranges, vec!["1:2-1:6", "3:10-3:14"]);
}

// ---------------------------------------------------------------------------
// Tests: validation
// ---------------------------------------------------------------------------

#[test]
fn validation_reports_unresolved_and_duplicate_names() {
    let dispatcher = Dispatcher::from_settings(&Settings::default());
    let actual = validate(
        &dispatcher,
        indoc! {"
            #%RAML 1.0
            title: Orders
            types:
              Order:
                properties:
                  id: integer
                  customer: Customer
              Order: object
            /orders:
              is: [paged]
        "},
    );
    let expected = expect![[r#"
        6:16-6:24 error: Reference to undeclared type 'Customer'
        7:2-7:7 warning: Duplicate type 'Order'
        9:7-9:12 error: Reference to undeclared trait 'paged'"#]];
    expected.assert_eq(&actual);
}

#[test]
fn validation_accepts_a_consistent_document() {
    let dispatcher = Dispatcher::from_settings(&Settings::default());
    let actual = validate(
        &dispatcher,
        indoc! {"
            #%RAML 1.0
            title: Orders
            traits:
              paged:
                queryParameters:
                  page: integer
            types:
              Order:
                properties:
                  id: integer
            /orders:
              is: [paged]
              get:
                responses:
                  200:
                    body:
                      application/json:
                        type: Order[]
        "},
    );
    expect![[r#"OK (no diagnostics)"#]].assert_eq(&actual);
}

#[test]
fn validation_resolves_parameterized_flow_references() {
    let dispatcher = Dispatcher::from_settings(&Settings::default());
    let actual = validate(
        &dispatcher,
        indoc! {"
            resourceTypes:
              collection: {}
            traits:
              paged: {}
            /users:
              type: { collection: { item: User } }
              is: [ paged: { size: 10 } ]
        "},
    );
    expect![[r#"OK (no diagnostics)"#]].assert_eq(&actual);
}

// ---------------------------------------------------------------------------
// Tests: settings
// ---------------------------------------------------------------------------

#[test]
fn settings_file_configures_the_dispatcher() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/no-rename/ramlsp.toml");
    let dispatcher = Dispatcher::from_settings(&load_settings(&path));
    assert!(!dispatcher.has_rename());

    let actual = validate(
        &dispatcher,
        indoc! {"
            types:
              Invoice:
                properties:
                  total: Money
                  payer: Customer
        "},
    );
    let expected = expect![[r#"4:13-4:21 warning: Reference to undeclared type 'Customer'"#]];
    expected.assert_eq(&actual);
}
