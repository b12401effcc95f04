/*
 * test_source_map.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Source maps: output segments carry IR ranges and output offsets, and
 * reassembling the segments reproduces the plain rendering.
 *
 * Run with: cargo test --test test_source_map
 */

use promark_ir::{build, Speaker};
use promark_writer::{IrRange, RichContent, Writer};

#[test]
fn test_segments_cover_the_output() {
    let doc = build::env(vec![build::paragraph(vec![
        "hello ".into(),
        build::bold(vec!["world".into()]).with_range(9, 17).into(),
    ])
    .with_range(0, 18)
    .into()])
    .with_range(0, 40);

    let segments = Writer::new().write_with_source_map(&doc).unwrap();
    assert_eq!(segments.len(), 2);

    assert_eq!(segments[0].ir_range, Some(IrRange::new(0, 18)));
    assert_eq!(segments[0].start_index, 0);
    assert_eq!(segments[0].end_index, 6);
    assert_eq!(segments[0].content, RichContent::Text("hello ".to_string()));

    assert_eq!(segments[1].ir_range, Some(IrRange::new(9, 17)));
    assert_eq!(segments[1].start_index, 6);
    assert_eq!(segments[1].end_index, 15);
    assert_eq!(
        segments[1].content,
        RichContent::Text("**world**".to_string())
    );
}

#[test]
fn test_segments_reassemble_to_plain_output() {
    let doc = build::env(vec![
        build::header(vec!["Title".into()]).with_range(0, 12).into(),
        build::paragraph(vec!["body".into()]).with_range(12, 30).into(),
    ]);
    let segments = Writer::new().write_with_source_map(&doc).unwrap();
    let reassembled: String = segments
        .iter()
        .filter_map(|s| s.content.as_text())
        .collect();
    match Writer::new().write(&doc).unwrap() {
        RichContent::Text(text) => assert_eq!(reassembled, text),
        other => panic!("expected text, got {other:?}"),
    }
    // Offsets are contiguous and strictly increasing.
    for pair in segments.windows(2) {
        assert_eq!(pair[0].end_index, pair[1].start_index);
    }
}

#[test]
fn test_joiner_attaches_to_preceding_segment() {
    let doc = build::env(vec![
        build::paragraph(vec!["one".into()]).with_range(0, 10).into(),
        build::paragraph(vec!["two".into()]).with_range(10, 20).into(),
    ]);
    let segments = Writer::new().write_with_source_map(&doc).unwrap();
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].content, RichContent::Text("one\n\n".to_string()));
    assert_eq!(segments[1].content, RichContent::Text("two".to_string()));
}

#[test]
fn test_media_occupies_one_output_position() {
    let doc = build::multimedia_env(vec![
        build::text("see ").with_range(0, 6).into(),
        build::image("aGk=", None, "image/png").with_range(6, 30).into(),
    ]);
    let segments = Writer::new().write_with_source_map(&doc).unwrap();
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].end_index, 4);
    assert_eq!(segments[1].start_index, 4);
    assert_eq!(segments[1].end_index, 5);
    assert!(matches!(segments[1].content, RichContent::Parts(_)));
}

#[test]
fn test_message_segments_offsets_span_messages() {
    let doc = build::env(vec![
        build::speaker_env(
            Speaker::System,
            vec![build::paragraph(vec!["rules".into()]).with_range(2, 18).into()],
        )
        .with_range(0, 20)
        .into(),
        build::speaker_env(
            Speaker::Human,
            vec![build::paragraph(vec!["question".into()]).with_range(22, 43).into()],
        )
        .with_range(20, 45)
        .into(),
    ]);
    let messages = Writer::new()
        .write_messages_with_source_map(&doc)
        .unwrap();
    assert_eq!(messages.len(), 2);

    assert_eq!(messages[0].speaker, Speaker::System);
    assert_eq!(messages[0].start_index, 0);
    assert_eq!(messages[0].end_index, 7);
    // The inter-message joiner belongs to the first message's last segment.
    assert_eq!(
        messages[0].content.last().unwrap().content,
        RichContent::Text("rules\n\n".to_string())
    );

    assert_eq!(messages[1].speaker, Speaker::Human);
    assert_eq!(messages[1].start_index, 7);
    assert_eq!(messages[1].end_index, 15);
    assert_eq!(messages[1].ir_range, Some(IrRange::new(22, 43)));
}
