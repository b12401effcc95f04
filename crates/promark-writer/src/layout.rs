/*
 * layout.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The box layout engine.
//!
//! Markup-mode IR is converted into [`LayoutBox`] values: block or inline
//! units carrying rendered fragments, an eviction priority, and a source
//! range. Boxes are built once per write call, truncated in place (see
//! [`crate::truncate`]), emitted as an ordered fragment list, and discarded.
//!
//! Layout is a pure function of the IR: identical input always yields
//! byte-identical fragments.

use crate::content::{ContentPart, Media, RichContent, ToolRequest, ToolResponse};
use crate::context::RenderContext;
use crate::error::{Result, WriteError};
use crate::options::TruncateDirection;
use promark_ir::{Child, Kind, ListStyle, MediaAttrs, Node, Position, Presentation, Syntax, WhiteSpace};
use promark_source_map::IrRange;

/// One piece of rendered output.
#[derive(Debug, Clone, PartialEq)]
pub enum Piece {
    Text(String),
    Part(ContentPart),
}

/// A piece together with the IR range it was rendered from.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub ir_range: Option<IrRange>,
    pub piece: Piece,
}

impl Fragment {
    pub fn text(ir_range: Option<IrRange>, text: impl Into<String>) -> Fragment {
        Fragment {
            ir_range,
            piece: Piece::Text(text.into()),
        }
    }

    pub fn part(ir_range: Option<IrRange>, part: ContentPart) -> Fragment {
        Fragment {
            ir_range,
            piece: Piece::Part(part),
        }
    }
}

/// Concatenated text of a fragment list, ignoring media parts.
pub fn plain_text(fragments: &[Fragment]) -> String {
    let mut out = String::new();
    for fragment in fragments {
        if let Piece::Text(text) = &fragment.piece {
            out.push_str(text);
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Block,
    Inline,
}

/// Truncation budget attached to a box, captured with the direction and
/// marker in effect where the node was built.
#[derive(Debug, Clone, PartialEq)]
pub struct LimitSpec {
    pub char_limit: Option<usize>,
    pub token_limit: Option<usize>,
    pub direction: TruncateDirection,
    pub marker: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoxKind {
    /// Fully rendered content.
    Leaf(Vec<Fragment>),
    /// Nested boxes; `tight` groups join with a single newline (lists).
    Group { children: Vec<LayoutBox>, tight: bool },
    /// Raw joiner text (explicit newlines); suppresses neighbor joiners.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBox {
    pub display: Display,
    pub kind: BoxKind,
    pub priority: i64,
    pub ir_range: Option<IrRange>,
    /// Force an extra blank line next to this block.
    pub blank_line: bool,
    pub limit: Option<LimitSpec>,
}

impl LayoutBox {
    fn new(display: Display, kind: BoxKind) -> LayoutBox {
        LayoutBox {
            display,
            kind,
            priority: 0,
            ir_range: None,
            blank_line: false,
            limit: None,
        }
    }

    fn leaf(display: Display, fragments: Vec<Fragment>) -> LayoutBox {
        LayoutBox::new(display, BoxKind::Leaf(fragments))
    }

    fn group(children: Vec<LayoutBox>, tight: bool) -> LayoutBox {
        LayoutBox::new(Display::Block, BoxKind::Group { children, tight })
    }

    fn is_raw(&self) -> bool {
        matches!(self.kind, BoxKind::Raw(_))
    }
}

/// Boxes produced for one node, with media hoisted toward the containing
/// block per the node's `position` attribute.
struct Built {
    boxes: Vec<LayoutBox>,
    top: Vec<LayoutBox>,
    bottom: Vec<LayoutBox>,
}

impl Built {
    fn none() -> Built {
        Built {
            boxes: Vec::new(),
            top: Vec::new(),
            bottom: Vec::new(),
        }
    }

    fn single(bx: LayoutBox) -> Built {
        Built {
            boxes: vec![bx],
            top: Vec::new(),
            bottom: Vec::new(),
        }
    }

    /// Absorb hoisted media: this node is the containing block.
    fn absorbed(self) -> Vec<LayoutBox> {
        let mut out = self.top;
        out.extend(self.boxes);
        out.extend(self.bottom);
        out
    }
}

fn decorate(mut bx: LayoutBox, node: &Node, ctx: &RenderContext) -> LayoutBox {
    bx.priority = node.meta.priority.unwrap_or(0);
    bx.ir_range = node.meta.ir_range();
    if node.meta.has_limit() {
        bx.limit = Some(LimitSpec {
            char_limit: node.meta.char_limit,
            token_limit: node.meta.token_limit,
            direction: ctx.options.truncate_direction,
            marker: ctx.options.truncate_marker.clone(),
        });
    }
    bx
}

fn apply_white_space(text: &str, mode: WhiteSpace) -> String {
    match mode {
        WhiteSpace::Pre => text.to_string(),
        WhiteSpace::Trim => text.trim().to_string(),
        WhiteSpace::Filter => {
            let mut out = String::with_capacity(text.len());
            let mut in_run = false;
            for c in text.chars() {
                if c.is_whitespace() {
                    if !in_run {
                        out.push(' ');
                        in_run = true;
                    }
                } else {
                    out.push(c);
                    in_run = false;
                }
            }
            out
        }
    }
}

/// Build the layout for a whole document.
///
/// A root `env` node is entered without deepening the header counter; any
/// other node is laid out as a single block in the root context.
pub fn build_root(node: &Node, ctx: &RenderContext) -> Result<LayoutBox> {
    if let Kind::Env(attrs) = &node.kind {
        let inner = ctx.enter_document(attrs, &node.meta, node.meta.ir_range())?;
        let children = build_blocks(&node.children, &inner, node.meta.ir_range())?;
        return Ok(decorate(LayoutBox::group(children, false), node, &inner));
    }
    let built = build_node(node, ctx)?;
    Ok(LayoutBox::group(built.absorbed(), false))
}

/// Render a node to its plain markup text, standalone. Used for nested
/// environments spliced into other formats and for fenced code content.
pub fn render_to_string(node: &Node, ctx: &RenderContext) -> Result<String> {
    let built = build_node(node, ctx)?;
    let mut root = LayoutBox::group(built.absorbed(), false);
    crate::truncate::apply_limits(&mut root);
    Ok(plain_text(&emit(&root)))
}

/// Boxes for a single top-level child, hoists absorbed. Used by message
/// segmentation, which walks the root environment's children itself.
pub(crate) fn build_child_blocks(
    child: &Child,
    ctx: &RenderContext,
    parent_range: Option<IrRange>,
) -> Result<Vec<LayoutBox>> {
    build_blocks(std::slice::from_ref(child), ctx, parent_range)
}

/// Block-level children of a container. Consecutive inline content stays in
/// document order and is grouped into lines at emission.
fn build_blocks(
    children: &[Child],
    ctx: &RenderContext,
    parent_range: Option<IrRange>,
) -> Result<Vec<LayoutBox>> {
    let mut out = Vec::new();
    for child in children {
        match child {
            Child::Text(text) => {
                let filtered = apply_white_space(text, ctx.white_space);
                if filtered.trim().is_empty() {
                    continue;
                }
                out.push(LayoutBox::leaf(
                    Display::Inline,
                    vec![Fragment::text(parent_range, filtered)],
                ));
            }
            Child::Node(node) => {
                out.extend(build_node(node, ctx)?.absorbed());
            }
        }
    }
    Ok(out)
}

fn build_node(node: &Node, ctx: &RenderContext) -> Result<Built> {
    let range = node.meta.ir_range();
    match &node.kind {
        Kind::Env(attrs) => {
            let inner = ctx.enter_env(attrs, &node.meta, range)?;
            match inner.presentation() {
                Presentation::Markup | Presentation::Multimedia => {
                    let children = build_blocks(&node.children, &inner, range)?;
                    Ok(Built::single(decorate(
                        LayoutBox::group(children, false),
                        node,
                        &inner,
                    )))
                }
                Presentation::Serialize => {
                    let rendered = crate::writers::data::write_env(node, &inner)?;
                    let bx = if attrs.inline {
                        LayoutBox::leaf(
                            Display::Inline,
                            vec![Fragment::text(range, format!("`{rendered}`"))],
                        )
                    } else {
                        LayoutBox::leaf(
                            Display::Block,
                            vec![Fragment::text(
                                range,
                                format!("```{}\n{}\n```", inner.syntax.as_str(), rendered),
                            )],
                        )
                    };
                    Ok(Built::single(decorate(bx, node, &inner)))
                }
                Presentation::Free => {
                    let rendered = crate::writers::free::write_env(node, &inner)?;
                    Ok(Built::single(decorate(
                        LayoutBox::leaf(Display::Block, vec![Fragment::text(range, rendered)]),
                        node,
                        &inner,
                    )))
                }
            }
        }

        Kind::Paragraph { blank_line } => {
            let (boxes, top, bottom) = build_inline_boxes(&node.children, ctx, range)?;
            let mut bx = decorate(
                LayoutBox::new(
                    Display::Block,
                    BoxKind::Group {
                        children: boxes,
                        tight: false,
                    },
                ),
                node,
                ctx,
            );
            bx.blank_line = *blank_line;
            let mut out = top;
            out.push(bx);
            out.extend(bottom);
            Ok(Built {
                boxes: out,
                top: Vec::new(),
                bottom: Vec::new(),
            })
        }

        Kind::Span => {
            let (fragments, top, bottom) = build_inline_run(&node.children, ctx, range)?;
            Ok(Built {
                boxes: vec![decorate(LayoutBox::leaf(Display::Inline, fragments), node, ctx)],
                top,
                bottom,
            })
        }

        Kind::Bold => build_wrapped(node, ctx, "**"),
        Kind::Italic => build_wrapped(node, ctx, "*"),
        Kind::Strikeout => build_wrapped(node, ctx, "~~"),
        Kind::Underline => build_wrapped(node, ctx, "__"),

        Kind::Header { level } => {
            let level = level.unwrap_or(ctx.header_level).clamp(1, 6);
            let (text, top, bottom) = inline_text(&node.children, ctx, range)?;
            let marker = "#".repeat(level);
            Ok(Built {
                boxes: vec![decorate(
                    LayoutBox::leaf(
                        Display::Block,
                        vec![Fragment::text(range, format!("{marker} {text}"))],
                    ),
                    node,
                    ctx,
                )],
                top,
                bottom,
            })
        }

        Kind::Code { inline, lang } => {
            let content = code_content(&node.children, ctx)?;
            let bx = if *inline {
                LayoutBox::leaf(
                    Display::Inline,
                    vec![Fragment::text(range, format!("`{content}`"))],
                )
            } else {
                let fence_lang = lang.as_deref().unwrap_or("");
                LayoutBox::leaf(
                    Display::Block,
                    vec![Fragment::text(
                        range,
                        format!("```{fence_lang}\n{content}\n```"),
                    )],
                )
            };
            Ok(Built::single(decorate(bx, node, ctx)))
        }

        Kind::Newline { count } => {
            let mut bx = LayoutBox::new(Display::Block, BoxKind::Raw("\n".repeat(*count)));
            bx.ir_range = range;
            Ok(Built::single(bx))
        }

        Kind::List { style } => build_list(node, style.as_deref(), ctx),

        Kind::Table | Kind::TableHead | Kind::TableBody => build_table(node, ctx),

        // A stray row/cell outside a table renders its children as blocks.
        Kind::TableRow | Kind::TableCell | Kind::Item => {
            let children = build_blocks(&node.children, ctx, range)?;
            Ok(Built::single(decorate(
                LayoutBox::group(children, false),
                node,
                ctx,
            )))
        }

        Kind::Text => {
            let mode = node.meta.white_space.unwrap_or(ctx.white_space);
            let mut text = String::new();
            for child in &node.children {
                match child {
                    Child::Text(raw) => text.push_str(&apply_white_space(raw, mode)),
                    Child::Node(nested) => {
                        text.push_str(&render_to_string(nested, ctx)?);
                    }
                }
            }
            Ok(Built::single(decorate(
                LayoutBox::leaf(Display::Inline, vec![Fragment::text(range, text)]),
                node,
                ctx,
            )))
        }

        Kind::Value { .. } | Kind::ObjData { .. } => Err(WriteError::validation(
            "Serialize value outside serialize environment",
            range,
        )),

        Kind::Image(attrs) => Ok(media_built(node, attrs, ctx, "image/png")),
        Kind::Audio(attrs) => Ok(media_built(node, attrs, ctx, "audio/wav")),

        Kind::ToolRequest { id, name, content } => {
            let (Some(id), Some(name)) = (id, name) else {
                return Err(WriteError::content(
                    "Tool request must have id and name attributes",
                    range,
                ));
            };
            let raw = content.as_deref().unwrap_or("");
            let parsed: serde_json::Value = serde_json::from_str(raw).map_err(|_| {
                WriteError::content("Invalid JSON content in tool request", range)
            })?;
            let part = ContentPart::ToolRequest(ToolRequest {
                id: id.clone(),
                name: name.clone(),
                content: parsed,
            });
            Ok(Built::single(decorate(
                LayoutBox::leaf(Display::Block, vec![Fragment::part(range, part)]),
                node,
                ctx,
            )))
        }

        Kind::ToolResponse { id, name } => {
            let (Some(id), Some(name)) = (id, name) else {
                return Err(WriteError::content(
                    "Tool response must have id and name attributes",
                    range,
                ));
            };
            if node.children.is_empty() {
                return Err(WriteError::content(
                    "Tool response must have children content",
                    range,
                ));
            }
            let children = build_blocks(&node.children, ctx, range)?;
            let mut inner = LayoutBox::group(children, false);
            crate::truncate::apply_limits(&mut inner);
            let content = response_content(&emit(&inner));
            let part = ContentPart::ToolResponse(ToolResponse {
                id: id.clone(),
                name: name.clone(),
                content,
            });
            Ok(Built::single(decorate(
                LayoutBox::leaf(Display::Block, vec![Fragment::part(range, part)]),
                node,
                ctx,
            )))
        }
    }
}

fn media_built(node: &Node, attrs: &MediaAttrs, ctx: &RenderContext, default_type: &str) -> Built {
    let part = ContentPart::Media(Media {
        media_type: attrs
            .media_type
            .clone()
            .unwrap_or_else(|| default_type.to_string()),
        base64: attrs.base64.clone(),
        alt: attrs.alt.clone(),
    });
    let bx = decorate(
        LayoutBox::leaf(
            Display::Inline,
            vec![Fragment::part(node.meta.ir_range(), part)],
        ),
        node,
        ctx,
    );
    match attrs.position {
        Position::Here => Built::single(bx),
        Position::Top => Built {
            boxes: Vec::new(),
            top: vec![bx],
            bottom: Vec::new(),
        },
        Position::Bottom => Built {
            boxes: Vec::new(),
            top: Vec::new(),
            bottom: vec![bx],
        },
    }
}

/// A tool response's mixed content: a plain string when the rendered
/// children are text-only, otherwise the ordered part list.
fn response_content(fragments: &[Fragment]) -> RichContent {
    let has_parts = fragments
        .iter()
        .any(|f| matches!(f.piece, Piece::Part(_)));
    if has_parts {
        RichContent::Parts(merge_parts(fragments))
    } else {
        RichContent::Text(plain_text(fragments))
    }
}

/// Collapse a fragment list into parts, merging adjacent text.
pub fn merge_parts(fragments: &[Fragment]) -> Vec<ContentPart> {
    let mut parts: Vec<ContentPart> = Vec::new();
    let mut buffer = String::new();
    for fragment in fragments {
        match &fragment.piece {
            Piece::Text(text) => buffer.push_str(text),
            Piece::Part(part) => {
                if !buffer.is_empty() {
                    parts.push(ContentPart::Text(std::mem::take(&mut buffer)));
                }
                parts.push(part.clone());
            }
        }
    }
    if !buffer.is_empty() {
        parts.push(ContentPart::Text(buffer));
    }
    parts
}

fn build_wrapped(node: &Node, ctx: &RenderContext, marker: &str) -> Result<Built> {
    let range = node.meta.ir_range();
    let (mut fragments, top, bottom) = build_inline_run(&node.children, ctx, range)?;
    if fragments.iter().any(|f| matches!(f.piece, Piece::Text(_))) {
        fragments.insert(0, Fragment::text(range, marker));
        fragments.push(Fragment::text(range, marker));
    }
    Ok(Built {
        boxes: vec![decorate(LayoutBox::leaf(Display::Inline, fragments), node, ctx)],
        top,
        bottom,
    })
}

/// Inline children as separate boxes (kept apart so priority eviction can
/// drop them individually under a limit).
fn build_inline_boxes(
    children: &[Child],
    ctx: &RenderContext,
    parent_range: Option<IrRange>,
) -> Result<(Vec<LayoutBox>, Vec<LayoutBox>, Vec<LayoutBox>)> {
    let mut boxes = Vec::new();
    let mut top = Vec::new();
    let mut bottom = Vec::new();
    for child in children {
        match child {
            Child::Text(text) => {
                let filtered = apply_white_space(text, ctx.white_space);
                if filtered.is_empty() {
                    continue;
                }
                boxes.push(LayoutBox::leaf(
                    Display::Inline,
                    vec![Fragment::text(parent_range, filtered)],
                ));
            }
            Child::Node(node) => {
                let built = build_node(node, ctx)?;
                top.extend(built.top);
                bottom.extend(built.bottom);
                boxes.extend(built.boxes);
            }
        }
    }
    Ok((boxes, top, bottom))
}

/// Inline children rendered to a joined fragment run.
fn build_inline_run(
    children: &[Child],
    ctx: &RenderContext,
    parent_range: Option<IrRange>,
) -> Result<(Vec<Fragment>, Vec<LayoutBox>, Vec<LayoutBox>)> {
    let (boxes, top, bottom) = build_inline_boxes(children, ctx, parent_range)?;
    let refs: Vec<&LayoutBox> = boxes.iter().collect();
    let mut fragments = Vec::new();
    emit_inline_run(&refs, &mut fragments);
    Ok((fragments, top, bottom))
}

/// Inline children rendered to plain text; media inside is hoisted before
/// the containing block.
fn inline_text(
    children: &[Child],
    ctx: &RenderContext,
    parent_range: Option<IrRange>,
) -> Result<(String, Vec<LayoutBox>, Vec<LayoutBox>)> {
    let (fragments, mut top, bottom) = build_inline_run(children, ctx, parent_range)?;
    for fragment in &fragments {
        if let Piece::Part(_) = &fragment.piece {
            top.push(LayoutBox::leaf(Display::Inline, vec![fragment.clone()]));
        }
    }
    Ok((plain_text(&fragments), top, bottom))
}

fn code_content(children: &[Child], ctx: &RenderContext) -> Result<String> {
    let mut out = String::new();
    for child in children {
        match child {
            Child::Text(text) => out.push_str(text),
            Child::Node(node) => out.push_str(&match &node.kind {
                Kind::Env(attrs) => {
                    let inner = ctx.enter_env(attrs, &node.meta, node.meta.ir_range())?;
                    match inner.presentation() {
                        Presentation::Serialize => crate::writers::data::write_env(node, &inner)?,
                        Presentation::Free => crate::writers::free::write_env(node, &inner)?,
                        Presentation::Markup => render_to_string(node, ctx)?,
                        Presentation::Multimedia => {
                            return Err(WriteError::validation(
                                "Invalid presentation",
                                node.meta.ir_range(),
                            ));
                        }
                    }
                }
                _ => render_to_string(node, ctx)?,
            }),
        }
    }
    Ok(out)
}

fn list_marker(style: ListStyle, index: usize) -> String {
    match style {
        ListStyle::Star => "*".to_string(),
        ListStyle::Dash => "-".to_string(),
        ListStyle::Plus => "+".to_string(),
        ListStyle::Decimal => format!("{}.", index + 1),
        ListStyle::Latin => format!("{}.", (b'a' + (index % 26) as u8) as char),
    }
}

fn indent_lines(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn build_list(node: &Node, style: Option<&str>, ctx: &RenderContext) -> Result<Built> {
    let range = node.meta.ir_range();
    let style = match style {
        Some(raw) => ListStyle::parse(raw)
            .ok_or_else(|| WriteError::validation(format!("Unknown list style '{raw}'"), range))?,
        None => ListStyle::Dash,
    };

    let mut items = Vec::new();
    let mut index = 0;
    for item in node.child_nodes() {
        let item_range = item.meta.ir_range();
        let mut inline_children = Vec::new();
        let mut nested = Vec::new();
        for child in &item.children {
            match child {
                Child::Node(n) if matches!(n.kind, Kind::List { .. }) => nested.push(n),
                other => inline_children.push(other.clone()),
            }
        }
        let (line, top, bottom) = inline_text(&inline_children, ctx, item_range)?;
        let mut text = format!("{} {}", list_marker(style, index), line);
        for sub in nested {
            let built = build_list(sub, sub_style(sub), ctx)?;
            let group = LayoutBox::group(built.absorbed(), true);
            text.push('\n');
            text.push_str(&indent_lines(&plain_text(&emit(&group)), "  "));
        }
        let bx = decorate(
            LayoutBox::leaf(Display::Block, vec![Fragment::text(item_range, text)]),
            item,
            ctx,
        );
        let mut boxes = top;
        boxes.push(bx);
        boxes.extend(bottom);
        items.extend(boxes);
        index += 1;
    }

    Ok(Built::single(decorate(
        LayoutBox::group(items, true),
        node,
        ctx,
    )))
}

fn sub_style(node: &Node) -> Option<&str> {
    match &node.kind {
        Kind::List { style } => style.as_deref(),
        _ => None,
    }
}

/// The rendered table grid: header row plus body rows of cell text.
pub(crate) struct TableGrid {
    pub header: Vec<String>,
    pub body: Vec<Vec<String>>,
}

pub(crate) fn table_grid(node: &Node, ctx: &RenderContext) -> Result<TableGrid> {
    let mut header_rows: Vec<Vec<String>> = Vec::new();
    let mut body_rows: Vec<Vec<String>> = Vec::new();

    fn row_cells(row: &Node, ctx: &RenderContext) -> Result<Vec<String>> {
        let mut cells = Vec::new();
        for cell in row.child_nodes() {
            let (text, _, _) = inline_text(&cell.children, ctx, cell.meta.ir_range())?;
            cells.push(text);
        }
        Ok(cells)
    }

    for child in node.child_nodes() {
        match &child.kind {
            Kind::TableHead => {
                for row in child.child_nodes() {
                    header_rows.push(row_cells(row, ctx)?);
                }
            }
            Kind::TableBody => {
                for row in child.child_nodes() {
                    body_rows.push(row_cells(row, ctx)?);
                }
            }
            Kind::TableRow => body_rows.push(row_cells(child, ctx)?),
            _ => {}
        }
    }

    let header = if !header_rows.is_empty() {
        body_rows.splice(0..0, header_rows.drain(1..).collect::<Vec<_>>());
        header_rows.remove(0)
    } else if !body_rows.is_empty() {
        body_rows.remove(0)
    } else {
        Vec::new()
    };

    Ok(TableGrid {
        header,
        body: body_rows,
    })
}

fn build_table(node: &Node, ctx: &RenderContext) -> Result<Built> {
    let range = node.meta.ir_range();
    let grid = table_grid(node, ctx)?;
    if grid.header.is_empty() && grid.body.is_empty() {
        return Ok(Built::none());
    }
    let text = match ctx.syntax {
        Syntax::Csv => delimited_table(&grid, ctx.options.csv_separator, ctx.options.csv_header),
        Syntax::Tsv => delimited_table(&grid, '\t', ctx.options.csv_header),
        _ => pipe_table(&grid, ctx.options.markdown_table_collapse),
    };
    Ok(Built::single(decorate(
        LayoutBox::leaf(Display::Block, vec![Fragment::text(range, text)]),
        node,
        ctx,
    )))
}

fn pipe_table(grid: &TableGrid, collapse: bool) -> String {
    let columns = grid
        .body
        .iter()
        .map(|row| row.len())
        .chain(std::iter::once(grid.header.len()))
        .max()
        .unwrap_or(0);

    fn cell(row: &[String], col: usize) -> &str {
        row.get(col).map(|s| s.as_str()).unwrap_or("")
    }

    let mut lines = Vec::new();
    if collapse {
        let render_row = |row: &[String]| -> String {
            let cells: Vec<String> = (0..columns).map(|c| cell(row, c).to_string()).collect();
            format!("| {} |", cells.join(" | "))
        };
        lines.push(render_row(&grid.header));
        lines.push(format!("| {} |", vec!["---"; columns].join(" | ")));
        for row in &grid.body {
            lines.push(render_row(row));
        }
    } else {
        // Column width = widest rendered cell in that column, header included.
        let mut widths = vec![0usize; columns];
        for col in 0..columns {
            widths[col] = std::iter::once(&grid.header)
                .chain(grid.body.iter())
                .map(|row| cell(row, col).chars().count())
                .max()
                .unwrap_or(0);
        }
        let render_row = |row: &[String]| -> String {
            let cells: Vec<String> = (0..columns)
                .map(|c| {
                    let text = cell(row, c);
                    let pad = widths[c].saturating_sub(text.chars().count());
                    format!("{}{}", text, " ".repeat(pad))
                })
                .collect();
            format!("| {} |", cells.join(" | "))
        };
        lines.push(render_row(&grid.header));
        let dashes: Vec<String> = widths.iter().map(|w| "-".repeat((*w).max(1))).collect();
        lines.push(format!("| {} |", dashes.join(" | ")));
        for row in &grid.body {
            lines.push(render_row(row));
        }
    }
    lines.join("\n")
}

fn delimited_cell(text: &str, separator: char) -> String {
    if text.contains(separator) || text.contains('"') || text.contains('\n') {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

fn delimited_table(grid: &TableGrid, separator: char, include_header: bool) -> String {
    let render_row = |row: &[String]| -> String {
        row.iter()
            .map(|c| delimited_cell(c, separator))
            .collect::<Vec<_>>()
            .join(&separator.to_string())
    };
    let mut lines = Vec::new();
    if include_header && !grid.header.is_empty() {
        lines.push(render_row(&grid.header));
    }
    for row in &grid.body {
        lines.push(render_row(row));
    }
    lines.join("\n")
}

/// Emit a box tree as an ordered fragment list, applying block joining and
/// the inline adjacency rule.
pub fn emit(bx: &LayoutBox) -> Vec<Fragment> {
    let mut out = Vec::new();
    emit_into(bx, &mut out);
    out
}

fn emit_into(bx: &LayoutBox, out: &mut Vec<Fragment>) {
    match &bx.kind {
        BoxKind::Raw(text) => out.push(Fragment::text(bx.ir_range, text.clone())),
        BoxKind::Leaf(fragments) => out.extend(fragments.iter().cloned()),
        BoxKind::Group { children, tight } => {
            let mut rendered: Vec<RenderedUnit> = Vec::new();
            for unit in group_units(children) {
                let mut fragments = Vec::new();
                let (raw, blank_line) = match &unit {
                    Unit::Block(block) => {
                        emit_into(block, &mut fragments);
                        (block.is_raw(), block.blank_line)
                    }
                    Unit::Line(run) => {
                        emit_inline_run(run, &mut fragments);
                        (false, false)
                    }
                };
                if fragments.is_empty() {
                    continue;
                }
                rendered.push(RenderedUnit {
                    fragments,
                    raw,
                    blank_line,
                });
            }
            for (index, unit) in rendered.iter().enumerate() {
                if index > 0 {
                    if let Some(joiner) = block_joiner(&rendered[index - 1], unit, *tight) {
                        out.push(Fragment::text(None, joiner));
                    }
                }
                out.extend(unit.fragments.iter().cloned());
            }
        }
    }
}

struct RenderedUnit {
    fragments: Vec<Fragment>,
    raw: bool,
    blank_line: bool,
}

impl RenderedUnit {
    fn ends_with_part(&self) -> bool {
        matches!(
            self.fragments.last().map(|f| &f.piece),
            Some(Piece::Part(_))
        )
    }

    fn starts_with_part(&self) -> bool {
        matches!(
            self.fragments.first().map(|f| &f.piece),
            Some(Piece::Part(_))
        )
    }
}

enum Unit<'a> {
    Block(&'a LayoutBox),
    Line(Vec<&'a LayoutBox>),
}

fn group_units(children: &[LayoutBox]) -> Vec<Unit<'_>> {
    let mut units = Vec::new();
    let mut run: Vec<&LayoutBox> = Vec::new();
    for child in children {
        match child.display {
            Display::Inline => run.push(child),
            Display::Block => {
                if !run.is_empty() {
                    units.push(Unit::Line(std::mem::take(&mut run)));
                }
                units.push(Unit::Block(child));
            }
        }
    }
    if !run.is_empty() {
        units.push(Unit::Line(run));
    }
    units
}

fn block_joiner(prev: &RenderedUnit, next: &RenderedUnit, tight: bool) -> Option<String> {
    if prev.raw || next.raw {
        return None;
    }
    // Media parts break the text flow; no joiner text attaches to them.
    if prev.ends_with_part() || next.starts_with_part() {
        return None;
    }
    if tight {
        return Some("\n".to_string());
    }
    if prev.blank_line || next.blank_line {
        Some("\n\n\n".to_string())
    } else {
        Some("\n\n".to_string())
    }
}

fn emit_inline_run(boxes: &[&LayoutBox], out: &mut Vec<Fragment>) {
    let mut trailing: Option<char> = None;
    for bx in boxes {
        let fragments = emit(bx);
        if fragments.is_empty() {
            continue;
        }
        let leading = leading_char(&fragments);
        // A space joins two adjacent inline pieces only when both boundary
        // characters are non-whitespace text. Media parts never attract one.
        if let (Some(left), Some(right)) = (trailing, leading)
            && !left.is_whitespace()
            && !right.is_whitespace()
        {
            out.push(Fragment::text(None, " "));
        }
        trailing = trailing_char(&fragments);
        out.extend(fragments);
    }
}

fn leading_char(fragments: &[Fragment]) -> Option<char> {
    for fragment in fragments {
        match &fragment.piece {
            Piece::Part(_) => return None,
            Piece::Text(text) => {
                if let Some(c) = text.chars().next() {
                    return Some(c);
                }
            }
        }
    }
    None
}

fn trailing_char(fragments: &[Fragment]) -> Option<char> {
    for fragment in fragments.iter().rev() {
        match &fragment.piece {
            Piece::Part(_) => return None,
            Piece::Text(text) => {
                if let Some(c) = text.chars().next_back() {
                    return Some(c);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::WriterOptions;
    use promark_ir::build;

    fn render(node: &Node) -> String {
        let ctx = RenderContext::root(WriterOptions::default());
        let mut root = build_root(node, &ctx).unwrap();
        crate::truncate::apply_limits(&mut root);
        plain_text(&emit(&root))
    }

    #[test]
    fn test_paragraphs_join_with_blank_line() {
        let doc = build::env(vec![
            build::paragraph(vec!["first".into()]).into(),
            build::paragraph(vec!["second".into()]).into(),
        ]);
        assert_eq!(render(&doc), "first\n\nsecond");
    }

    #[test]
    fn test_inline_adjacency_space() {
        let doc = build::env(vec![build::paragraph(vec![
            "hello".into(),
            build::bold(vec!["world".into()]).into(),
        ])
        .into()]);
        assert_eq!(render(&doc), "hello **world**");
    }

    #[test]
    fn test_no_space_after_trailing_whitespace() {
        let doc = build::env(vec![build::paragraph(vec![
            "hello ".into(),
            build::bold(vec!["world".into()]).into(),
        ])
        .into()]);
        assert_eq!(render(&doc), "hello **world**");
    }

    #[test]
    fn test_inline_markers() {
        let doc = build::env(vec![build::paragraph(vec![
            build::italic(vec!["a".into()]).into(),
            build::strikeout(vec!["b".into()]).into(),
            build::underline(vec!["c".into()]).into(),
        ])
        .into()]);
        assert_eq!(render(&doc), "*a* ~~b~~ __c__");
    }

    #[test]
    fn test_empty_style_wrapper_emits_nothing() {
        let doc = build::env(vec![build::paragraph(vec![
            build::bold(vec![]).into(),
            "tail".into(),
        ])
        .into()]);
        assert_eq!(render(&doc), "tail");
    }

    #[test]
    fn test_header_levels_follow_nesting() {
        let doc = build::env(vec![
            build::header(vec!["Outer".into()]).into(),
            build::env(vec![build::header(vec!["Inner".into()]).into()]).into(),
        ]);
        assert_eq!(render(&doc), "# Outer\n\n## Inner");
    }

    #[test]
    fn test_explicit_header_level_wins() {
        let doc = build::env(vec![build::header_at(4, vec!["Deep".into()]).into()]);
        assert_eq!(render(&doc), "#### Deep");
    }

    #[test]
    fn test_list_markers() {
        let doc = build::env(vec![build::list(
            None,
            vec![
                build::item(vec!["a".into()]),
                build::item(vec!["b".into()]),
            ],
        )
        .into()]);
        assert_eq!(render(&doc), "- a\n- b");

        let doc = build::env(vec![build::list(
            Some("decimal"),
            vec![
                build::item(vec!["a".into()]),
                build::item(vec!["b".into()]),
            ],
        )
        .into()]);
        assert_eq!(render(&doc), "1. a\n2. b");
    }

    #[test]
    fn test_nested_list_indents() {
        let doc = build::env(vec![build::list(
            None,
            vec![build::item(vec![
                "outer".into(),
                build::list(Some("star"), vec![build::item(vec!["inner".into()])]).into(),
            ])],
        )
        .into()]);
        assert_eq!(render(&doc), "- outer\n  * inner");
    }

    #[test]
    fn test_unknown_list_style_is_rejected() {
        let ctx = RenderContext::root(WriterOptions::default());
        let doc = build::env(vec![build::list(
            Some("roman"),
            vec![build::item(vec!["x".into()])],
        )
        .into()]);
        let err = build_root(&doc, &ctx).unwrap_err();
        assert_eq!(err.to_string(), "Unknown list style 'roman'");
    }

    #[test]
    fn test_pipe_table_pads_to_widest_cell() {
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
        assert_eq!(
            render(&doc),
            "| name  | age |\n| ----- | --- |\n| alice | 30  |"
        );
    }

    #[test]
    fn test_pipe_table_ragged_row_pads_missing_cells() {
        let doc = build::env(vec![build::table(vec![
            build::table_head(vec![build::table_row(vec![
                build::table_cell(vec!["name".into()]),
                build::table_cell(vec!["age".into()]),
            ])])
            .into(),
            build::table_body(vec![build::table_row(vec![build::table_cell(vec![
                "bob".into(),
            ])])])
            .into(),
        ])
        .into()]);
        assert_eq!(
            render(&doc),
            "| name | age |\n| ---- | --- |\n| bob  |     |"
        );
    }

    #[test]
    fn test_code_block_and_inline() {
        let doc = build::env(vec![
            build::paragraph(vec![build::code("x + y").into()]).into(),
            build::code_block(Some("rust"), vec!["fn main() {}".into()]).into(),
        ]);
        assert_eq!(render(&doc), "`x + y`\n\n```rust\nfn main() {}\n```");
    }

    #[test]
    fn test_explicit_newlines_replace_joiners() {
        let doc = build::env(vec![
            build::paragraph(vec!["a".into()]).into(),
            build::newline(1).into(),
            build::paragraph(vec!["b".into()]).into(),
        ]);
        assert_eq!(render(&doc), "a\nb");
    }

    #[test]
    fn test_filter_collapses_whitespace_runs() {
        let doc = build::env(vec![build::paragraph(vec!["a\n\n  b".into()]).into()]);
        assert_eq!(render(&doc), "a b");
    }

    #[test]
    fn test_pre_keeps_whitespace() {
        let doc = build::env(vec![
            build::text("  two  spaces\n").with_white_space(WhiteSpace::Pre).into(),
        ]);
        assert_eq!(render(&doc), "  two  spaces\n");
    }
}
