//! Browser implementation of caret capture and restore.
//!
//! Offsets count UTF-16 units of the element's text nodes in document order,
//! skipping any subtree marked `contenteditable="false"`. For `<textarea>`
//! and text `<input>` the control's own selection API is used instead.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlInputElement, HtmlTextAreaElement, Node, Text};

use proofmark_core::{CaretPlatform, PlatformError, clamp_offset, locate_offset, utf16_len};

use crate::describe_js;

/// Selection-API caret platform. Stateless; every call looks up the
/// element's own document so regions inside frames work.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserCaret;

impl CaretPlatform for BrowserCaret {
    type Surface = Element;

    fn capture_offset(&self, surface: &Element) -> usize {
        match capture_caret_offset(surface) {
            Ok(offset) => offset,
            Err(e) => {
                tracing::debug!(target: "proofmark::caret", error = %e, "no caret to capture");
                0
            }
        }
    }

    fn restore_offset(&self, surface: &Element, offset: usize) -> Result<(), PlatformError> {
        restore_caret_offset(surface, offset)
    }
}

fn owner_document(element: &Element) -> Result<Document, PlatformError> {
    element
        .owner_document()
        .ok_or_else(|| PlatformError::from("element has no owner document"))
}

/// Text nodes under `container` in document order, skipping
/// `contenteditable="false"` subtrees.
pub fn collect_text_nodes(container: &Element) -> Result<Vec<Text>, PlatformError> {
    let document = owner_document(container)?;
    let walker = document
        .create_tree_walker_with_what_to_show(container, 0xFFFFFFFF)
        .map_err(|e| format!("create_tree_walker failed: {}", describe_js(e)))?;

    let mut nodes = Vec::new();
    let mut skip_until_exit: Option<Element> = None;

    while let Ok(Some(node)) = walker.next_node() {
        if let Some(ref skip_elem) = skip_until_exit {
            if skip_elem.contains(Some(&node)) {
                continue;
            }
            skip_until_exit = None;
        }

        if let Some(element) = node.dyn_ref::<Element>() {
            if element.get_attribute("contenteditable").as_deref() == Some("false") {
                skip_until_exit = Some(element.clone());
            }
            continue;
        }

        if let Ok(text) = node.dyn_into::<Text>() {
            nodes.push(text);
        }
    }

    Ok(nodes)
}

fn text_len(text: &Text) -> usize {
    text.data().encode_utf16().count()
}

/// Caret offset of the selection's end boundary inside `element`.
pub fn capture_caret_offset(element: &Element) -> Result<usize, PlatformError> {
    if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
        return Ok(area.selection_end().ok().flatten().unwrap_or(0) as usize);
    }
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        return Ok(input.selection_end().ok().flatten().unwrap_or(0) as usize);
    }

    let document = owner_document(element)?;
    let selection = document
        .get_selection()
        .map_err(|e| format!("get_selection failed: {}", describe_js(e)))?
        .ok_or("no selection object")?;
    if selection.range_count() == 0 {
        return Ok(0);
    }
    let range = selection
        .get_range_at(0)
        .map_err(|e| format!("get_range_at failed: {}", describe_js(e)))?;
    let end_container = range
        .end_container()
        .map_err(|e| format!("end_container failed: {}", describe_js(e)))?;
    let end_offset = range
        .end_offset()
        .map_err(|e| format!("end_offset failed: {}", describe_js(e)))? as usize;

    let element_node: &Node = element.as_ref();
    if !element_node.contains(Some(&end_container)) {
        return Ok(0);
    }

    // Collapsed probe at the selection end, to order text nodes against it.
    let probe = document
        .create_range()
        .map_err(|e| format!("create_range failed: {}", describe_js(e)))?;
    probe
        .set_start(&end_container, end_offset as u32)
        .map_err(|e| format!("set_start failed: {}", describe_js(e)))?;
    probe.collapse_with_to_start(true);

    let mut offset = 0;
    for text in collect_text_nodes(element)? {
        let node: &Node = text.as_ref();
        if *node == end_container {
            return Ok(offset + end_offset);
        }
        let len = text_len(&text);
        match probe.compare_point(node, len as u32) {
            // Node ends at or before the caret.
            Ok(ordering) if ordering <= 0 => offset += len,
            _ => break,
        }
    }
    Ok(offset)
}

/// Place a collapsed caret at `offset` inside `element`.
///
/// Offsets past the end land at the end. An element without text nodes is
/// left alone.
pub fn restore_caret_offset(element: &Element, offset: usize) -> Result<(), PlatformError> {
    if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
        let pos = clamp_offset(offset, utf16_len(&area.value())) as u32;
        return area
            .set_selection_range(pos, pos)
            .map_err(|e| format!("set_selection_range failed: {}", describe_js(e)).into());
    }
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        let pos = clamp_offset(offset, utf16_len(&input.value())) as u32;
        return input
            .set_selection_range(pos, pos)
            .map_err(|e| format!("set_selection_range failed: {}", describe_js(e)).into());
    }

    let nodes = collect_text_nodes(element)?;
    let lengths: Vec<usize> = nodes.iter().map(text_len).collect();
    let Some(position) = locate_offset(&lengths, offset) else {
        return Ok(());
    };
    let node = &nodes[position.node_index];

    tracing::trace!(
        target: "proofmark::caret",
        offset,
        node_index = position.node_index,
        offset_in_node = position.offset_in_node,
        "restoring caret"
    );

    let document = owner_document(element)?;
    let selection = document
        .get_selection()
        .map_err(|e| format!("get_selection failed: {}", describe_js(e)))?
        .ok_or("no selection object")?;
    let range = document
        .create_range()
        .map_err(|e| format!("create_range failed: {}", describe_js(e)))?;
    range
        .set_start(node, position.offset_in_node as u32)
        .map_err(|e| format!("set_start failed: {}", describe_js(e)))?;
    range.collapse_with_to_start(true);

    selection
        .remove_all_ranges()
        .map_err(|e| format!("remove_all_ranges failed: {}", describe_js(e)))?;
    selection
        .add_range(&range)
        .map_err(|e| format!("add_range failed: {}", describe_js(e)))?;

    Ok(())
}

/// Run `mutate` with the caret captured before and restored after.
///
/// Restore failures are logged, never returned.
pub fn preserving_caret<T>(element: &Element, mutate: impl FnOnce() -> T) -> T {
    let caret = BrowserCaret;
    let offset = caret.capture_offset(element);
    let result = mutate();
    if let Err(e) = caret.restore_offset(element, offset) {
        tracing::warn!(target: "proofmark::caret", error = %e, offset, "caret restore failed");
    }
    result
}
