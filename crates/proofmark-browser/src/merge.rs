//! Merging planned issues into a region's DOM as marker spans.
//!
//! Markers are created by splitting the affected text node in place and
//! wrapping the middle piece, so untouched text nodes, elements and their
//! listeners are never recreated. Text already inside a marker is never
//! considered again, which makes reconcile idempotent.

use smol_str::SmolStr;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, HtmlTextAreaElement, Node, Text};

use proofmark_core::{
    Analysis, Category, IssueFilter, MarkerIdGen, MarkerPlan, Placement, PlatformError, TextRun,
    plan_markers,
};

use crate::caret::{collect_text_nodes, preserving_caret};
use crate::describe_js;
use crate::style::marker_style;

pub const MARKER_CLASS: &str = "highlight-suggest";
pub const MARKER_SELECTOR: &str = "span.highlight-suggest";

const TYPE_ATTR: &str = "data-type";
const ORIGINAL_ATTR: &str = "data-original";
const SUGGESTIONS_ATTR: &str = "data-suggestions";

/// Back-reference data stored on a marker element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkerInfo {
    pub id: SmolStr,
    pub category: Category,
    /// The occurrence as it was written when the marker was created.
    pub original: String,
    pub suggestions: Vec<String>,
}

impl MarkerInfo {
    /// Read the data back off a marker element.
    pub fn read(marker: &Element) -> Option<Self> {
        let category = marker.get_attribute(TYPE_ATTR)?.parse().ok()?;
        let suggestions = marker
            .get_attribute(SUGGESTIONS_ATTR)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        Some(Self {
            id: SmolStr::new(marker.id()),
            category,
            original: marker.get_attribute(ORIGINAL_ATTR).unwrap_or_default(),
            suggestions,
        })
    }
}

/// Whether reconcile may mutate this element's content.
pub fn is_markable(element: &Element) -> bool {
    element
        .dyn_ref::<HtmlElement>()
        .is_some_and(|e| e.is_content_editable())
        && element.dyn_ref::<HtmlTextAreaElement>().is_none()
        && element.dyn_ref::<HtmlInputElement>().is_none()
}

/// Text sent to the analysis service for a region.
pub fn plain_text(element: &Element) -> String {
    if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
        return area.value();
    }
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        return input.value();
    }
    match element.dyn_ref::<HtmlElement>() {
        Some(html) => html.inner_text(),
        None => element.text_content().unwrap_or_default(),
    }
}

/// The marker containing `node` inside `region`, if any.
fn enclosing_marker(node: &Node, region: &Element) -> Option<Element> {
    let marker = node.parent_element()?.closest(MARKER_SELECTOR).ok()??;
    region.contains(Some(&marker)).then_some(marker)
}

/// Text nodes of `region` with their planner view.
pub fn collect_text_runs(region: &Element) -> Result<(Vec<Text>, Vec<TextRun>), PlatformError> {
    let nodes = collect_text_nodes(region)?;
    let runs = nodes
        .iter()
        .map(|text| TextRun {
            text: text.data(),
            marked: enclosing_marker(text.as_ref(), region).is_some(),
        })
        .collect();
    Ok((nodes, runs))
}

/// All markers currently inside `region`.
pub fn markers_in(region: &Element) -> Vec<Element> {
    let mut markers = Vec::new();
    if let Ok(list) = region.query_selector_all(MARKER_SELECTOR) {
        for i in 0..list.length() {
            if let Some(el) = list.get(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                markers.push(el);
            }
        }
    }
    markers
}

/// Wrap every surviving issue occurrence in `region` in a marker.
///
/// Issues are passed through `filters` first. Returns the newly created
/// markers; an empty result means the DOM was not touched. Regions that are
/// not contenteditable are never mutated.
pub fn reconcile(
    region: &Element,
    analysis: &Analysis,
    filters: &[&dyn IssueFilter],
    ids: &mut MarkerIdGen,
) -> Result<Vec<Element>, PlatformError> {
    if !is_markable(region) {
        return Ok(Vec::new());
    }

    let (nodes, runs) = collect_text_runs(region)?;
    let plain: String = runs.iter().map(|r| r.text.as_str()).collect();

    let mut analysis = analysis.clone();
    for filter in filters {
        filter.apply(&plain, &mut analysis);
    }

    let plan = plan_markers(&runs, analysis.iter());
    if plan.is_empty() {
        tracing::trace!(target: "proofmark::merge", "nothing new to mark");
        return Ok(Vec::new());
    }

    let document = region
        .owner_document()
        .ok_or("region has no owner document")?;

    let created = preserving_caret(region, || apply_plan(&document, &nodes, &plan, ids));
    tracing::debug!(
        target: "proofmark::merge",
        planned = plan.len(),
        created = created.len(),
        "markers applied"
    );
    Ok(created)
}

fn apply_plan(
    document: &Document,
    nodes: &[Text],
    plan: &MarkerPlan,
    ids: &mut MarkerIdGen,
) -> Vec<Element> {
    let mut created = Vec::with_capacity(plan.len());
    for run_index in plan.touched_runs() {
        let node = &nodes[run_index];
        let placements: Vec<&Placement> = plan.for_run(run_index).collect();
        let mut in_run = Vec::with_capacity(placements.len());
        // Right to left so earlier offsets stay valid after each split.
        for placement in placements.into_iter().rev() {
            match wrap_placement(document, node, placement, ids) {
                Ok(marker) => in_run.push(marker),
                Err(e) => tracing::warn!(
                    target: "proofmark::merge",
                    error = %e,
                    text = %placement.text,
                    "could not wrap occurrence"
                ),
            }
        }
        if node.length() == 0 {
            node.remove();
        }
        created.extend(in_run.into_iter().rev());
    }
    created
}

fn wrap_placement(
    document: &Document,
    node: &Text,
    placement: &Placement,
    ids: &mut MarkerIdGen,
) -> Result<Element, PlatformError> {
    let tail = node
        .split_text(placement.utf16_range.end as u32)
        .map_err(|e| format!("split_text failed: {}", describe_js(e)))?;
    if tail.length() == 0 {
        tail.remove();
    }
    let middle = node
        .split_text(placement.utf16_range.start as u32)
        .map_err(|e| format!("split_text failed: {}", describe_js(e)))?;

    let marker = create_marker(document, placement, ids.next_id())?;
    let parent = middle.parent_node().ok_or("split text has no parent")?;
    parent
        .replace_child(&marker, &middle)
        .map_err(|e| format!("replace_child failed: {}", describe_js(e)))?;
    marker
        .append_child(&middle)
        .map_err(|e| format!("append_child failed: {}", describe_js(e)))?;
    Ok(marker)
}

fn create_marker(
    document: &Document,
    placement: &Placement,
    id: SmolStr,
) -> Result<Element, PlatformError> {
    let marker = document
        .create_element("span")
        .map_err(|e| format!("create_element failed: {}", describe_js(e)))?;
    let suggestions = serde_json::to_string(&placement.suggestions)
        .map_err(|e| format!("could not encode suggestions: {e}"))?;
    marker.set_id(&id);
    marker.set_class_name(MARKER_CLASS);
    let attrs = [
        (TYPE_ATTR, placement.category.as_str()),
        (ORIGINAL_ATTR, placement.text.as_str()),
        (SUGGESTIONS_ATTR, suggestions.as_str()),
        ("style", &marker_style(placement.category)),
    ];
    for (name, value) in attrs {
        marker
            .set_attribute(name, value)
            .map_err(|e| format!("set_attribute {name} failed: {}", describe_js(e)))?;
    }
    Ok(marker)
}

/// Replace `marker` with a plain text node holding its current text.
///
/// The caller is responsible for caret preservation.
pub fn unwrap_marker(marker: &Element) -> Result<(), PlatformError> {
    let parent = marker.parent_node().ok_or("marker is detached")?;
    let document = marker.owner_document().ok_or("marker has no document")?;
    let text = document.create_text_node(&marker.text_content().unwrap_or_default());
    parent
        .replace_child(&text, marker)
        .map_err(|e| format!("replace_child failed: {}", describe_js(e)))?;
    parent.normalize();
    Ok(())
}

/// Unwrap `marker` inside `region`, keeping the caret where it was.
pub fn unwrap_in_region(region: &Element, marker: &Element) -> Result<(), PlatformError> {
    preserving_caret(region, || unwrap_marker(marker))
}

/// Remove every marker in `region`, caret preserved. Returns how many went.
pub fn strip_markers(region: &Element) -> usize {
    let markers = markers_in(region);
    if markers.is_empty() {
        return 0;
    }
    preserving_caret(region, || {
        markers
            .iter()
            .filter(|m| match unwrap_marker(m) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(target: "proofmark::merge", error = %e, "could not unwrap marker");
                    false
                }
            })
            .count()
    })
}
