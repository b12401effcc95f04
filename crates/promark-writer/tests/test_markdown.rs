/*
 * test_markdown.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * End-to-end markdown rendering through the public Writer API.
 *
 * Run with: cargo test --test test_markdown
 */

use promark_ir::build;
use promark_writer::{RichContent, Writer, WriterOptions};

fn write_text(node: &promark_ir::Node) -> String {
    match Writer::new().write(node).unwrap() {
        RichContent::Text(text) => text,
        other => panic!("expected plain text output, got {other:?}"),
    }
}

#[test]
fn test_paragraph_with_inline_styles() {
    let doc = build::env(vec![build::paragraph(vec![
        "hello ".into(),
        build::bold(vec!["world".into()]).into(),
    ])
    .into()]);
    assert_eq!(write_text(&doc), "hello **world**");
}

#[test]
fn test_document_structure() {
    let doc = build::env(vec![
        build::header(vec!["Task".into()]).into(),
        build::paragraph(vec!["Summarize the following.".into()]).into(),
        build::list(
            None,
            vec![
                build::item(vec!["be brief".into()]),
                build::item(vec!["be accurate".into()]),
            ],
        )
        .into(),
    ]);
    assert_eq!(
        write_text(&doc),
        "# Task\n\nSummarize the following.\n\n- be brief\n- be accurate"
    );
}

#[test]
fn test_document_snapshot() {
    let doc = build::env(vec![
        build::header(vec!["Context".into()]).into(),
        build::paragraph(vec![
            "Use ".into(),
            build::code("promark").into(),
            "to render prompts.".into(),
        ])
        .into(),
        build::env(vec![build::header(vec!["Rules".into()]).into()]).into(),
    ]);
    insta::assert_snapshot!(write_text(&doc), @r"
    # Context

    Use `promark` to render prompts.

    ## Rules
    ");
}

#[test]
fn test_base_header_level_option() {
    let mut options = WriterOptions::default();
    options.markdown_base_header_level = 3;
    let writer = Writer::with_options(options);
    let doc = build::env(vec![build::header(vec!["Deep".into()]).into()]);
    match writer.write(&doc).unwrap() {
        RichContent::Text(text) => assert_eq!(text, "### Deep"),
        other => panic!("expected text, got {other:?}"),
    }
}

#[test]
fn test_collapsed_table() {
    let mut options = WriterOptions::default();
    options.markdown_table_collapse = true;
    let writer = Writer::with_options(options);
    let doc = build::env(vec![build::table(vec![
        build::table_head(vec![build::table_row(vec![
            build::table_cell(vec!["name".into()]),
            build::table_cell(vec!["age".into()]),
        ])])
        .into(),
        build::table_body(vec![build::table_row(vec![
            build::table_cell(vec!["alice".into()]),
            build::table_cell(vec!["30".into()]),
        ])])
        .into(),
    ])
    .into()]);
    match writer.write(&doc).unwrap() {
        RichContent::Text(text) => {
            assert_eq!(text, "| name | age |\n| --- | --- |\n| alice | 30 |");
        }
        other => panic!("expected text, got {other:?}"),
    }
}

#[test]
fn test_csv_sublanguage() {
    let doc = build::env(vec![build::table(vec![
        build::table_head(vec![build::table_row(vec![
            build::table_cell(vec!["name".into()]),
            build::table_cell(vec!["note".into()]),
        ])])
        .into(),
        build::table_body(vec![build::table_row(vec![
            build::table_cell(vec!["alice".into()]),
            build::table_cell(vec!["likes, commas".into()]),
        ])])
        .into(),
    ])
    .into()]);
    let csv = promark_ir::Node::new(promark_ir::Kind::Env(promark_ir::EnvAttrs {
        syntax: Some("csv".to_string()),
        ..promark_ir::EnvAttrs::default()
    }))
    .with_children(doc.children.clone());
    assert_eq!(
        write_text(&csv),
        "name,note\nalice,\"likes, commas\""
    );
}

#[test]
fn test_free_root_is_verbatim() {
    let doc = build::free_env(vec!["  raw\n    text\n".into()]);
    assert_eq!(write_text(&doc), "  raw\n    text\n");
}

#[test]
fn test_unknown_syntax_reports_validation_error() {
    let doc = promark_ir::Node::new(promark_ir::Kind::Env(promark_ir::EnvAttrs {
        syntax: Some("html".to_string()),
        ..promark_ir::EnvAttrs::default()
    }))
    .with_range(3, 19);
    let err = Writer::new().write(&doc).unwrap_err();
    assert_eq!(err.to_string(), "Unknown syntax 'html'");
    assert_eq!(err.range(), Some(promark_writer::IrRange::new(3, 19)));
}
