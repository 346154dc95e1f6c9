//! Colours and injected CSS for markers and overlays.

use proofmark_core::Category;
use web_sys::Document;

/// Id of the `<style>` element injected once per document.
pub const STYLESHEET_ID: &str = "proofmark-style";

/// Convert RGBA u32 (packed as 0xRRGGBBAA) to a CSS hex colour.
///
/// Fully opaque colours use the short `#rrggbb` form.
pub fn rgba_u32_to_hex(color: u32) -> String {
    let alpha = color & 0xFF;
    if alpha == 0xFF {
        format!("#{:06x}", color >> 8)
    } else {
        format!("#{:08x}", color)
    }
}

/// Inline style for a marker span of the given category.
pub fn marker_style(category: Category) -> String {
    format!(
        "border-bottom: 2px dotted {}; cursor: pointer; padding: 0 2px; border-radius: 2px; \
         transition: background 0.2s ease;",
        rgba_u32_to_hex(category.color())
    )
}

const STYLESHEET: &str = r#"
.highlight-suggest:hover {
  background: rgba(255, 255, 150, 0.5) !important;
  box-shadow: 0 0 3px rgba(0, 0, 0, 0.1);
}
.proofmark-popover, .proofmark-correction {
  position: absolute;
  background: #ffffff;
  border: 1px solid #ddd;
  border-radius: 6px;
  box-shadow: 0 2px 8px rgba(0, 0, 0, 0.15);
  z-index: 10000;
  font-size: 14px;
  overflow: hidden;
}
.proofmark-popover { min-width: 180px; max-width: 300px; }
.proofmark-correction { min-width: 300px; max-width: 450px; font-family: Arial, sans-serif; }
.proofmark-header {
  padding: 8px 12px;
  border-bottom: 1px solid #eee;
  display: flex;
  align-items: center;
  justify-content: space-between;
  background-color: #f9f9f9;
  font-size: 13px;
  color: #666;
}
.proofmark-dot {
  width: 12px;
  height: 12px;
  border-radius: 50%;
  margin-right: 6px;
  display: inline-block;
}
.proofmark-item { padding: 8px 12px; cursor: pointer; border-bottom: 1px solid #f0f0f0; }
.proofmark-item:hover, .proofmark-action:hover { background-color: #f5f5f5; }
.proofmark-footer { display: flex; border-top: 1px solid #eee; background-color: #f9f9f9; }
.proofmark-action { padding: 8px 12px; font-size: 13px; color: #666; cursor: pointer; flex: 1; text-align: center; }
.proofmark-action[data-action="dictionary"] { color: #1a73e8; border-right: 1px solid #eee; }
.proofmark-original, .proofmark-corrected {
  padding: 12px 16px;
  border-bottom: 1px solid #eee;
  line-height: 1.5;
  max-height: 100px;
  overflow-y: auto;
}
.proofmark-original { color: #666; text-decoration: line-through; }
.proofmark-corrected { color: #333; }
.proofmark-buttons { padding: 12px 16px; display: flex; gap: 8px; background-color: #f9f9f9; }
.proofmark-buttons button { border-radius: 4px; padding: 8px 12px; cursor: pointer; }
.proofmark-accept { background-color: #00a67d; color: white; border: none; font-weight: 500; }
.proofmark-dismiss { background-color: transparent; color: #666; border: 1px solid #ddd; }
.proofmark-close { background: none; border: none; cursor: pointer; font-size: 16px; color: #666; }
.proofmark-notice {
  position: fixed;
  bottom: 20px;
  right: 20px;
  padding: 8px 12px;
  border-radius: 6px;
  font-size: 14px;
  box-shadow: 0 2px 8px rgba(0, 0, 0, 0.1);
  z-index: 10000;
  transition: opacity 0.3s ease;
  cursor: pointer;
}
.proofmark-notice[data-kind="info"] { background: #f0f7ff; border: 1px solid #d0e3ff; color: #1a73e8; }
.proofmark-notice[data-kind="success"] { background: #e6f4ea; border: 1px solid #ceead6; color: #1e8e3e; }
.proofmark-notice[data-kind="warning"] { background: #fef7e0; border: 1px solid #feefc3; color: #b06000; }
.proofmark-notice[data-kind="error"] { background: #fce8e6; border: 1px solid #fadbd9; color: #c5221f; }
.proofmark-trigger {
  position: absolute;
  width: 22px;
  height: 22px;
  padding: 2px;
  border: 1px solid #ccc;
  border-radius: 4px;
  background-color: #fff;
  box-shadow: 0 0 3px rgba(0, 0, 0, 0.1);
  font-size: 11px;
  line-height: 16px;
  cursor: pointer;
  opacity: 0.9;
  z-index: 9999;
}
.proofmark-trigger[hidden] { display: none; }
@keyframes proofmark-spin {
  0% { transform: rotate(0deg); }
  100% { transform: rotate(360deg); }
}
.spinner-active { opacity: 0.7; }
.loading-spinner {
  position: absolute;
  top: 0;
  left: 0;
  width: 100%;
  height: 100%;
  border-radius: 50%;
  border: 2px solid rgba(0, 0, 0, 0.1);
  border-top-color: #00a67d;
  animation: proofmark-spin 0.8s linear infinite;
}
"#;

/// Inject the shared stylesheet into `document` if it is not there yet.
pub fn ensure_stylesheet(document: &Document) {
    if document.get_element_by_id(STYLESHEET_ID).is_some() {
        return;
    }
    let Ok(style) = document.create_element("style") else {
        return;
    };
    style.set_id(STYLESHEET_ID);
    style.set_text_content(Some(STYLESHEET));
    let parent = document
        .head()
        .map(web_sys::Element::from)
        .or_else(|| document.document_element());
    if let Some(parent) = parent {
        if let Err(e) = parent.append_child(&style) {
            tracing::warn!(error = ?e, "could not inject stylesheet");
        }
    }
}
