//! `{page}` / `{total}` token expansion for header and footer slots

pub const PAGE_TOKEN: &str = "{page}";
pub const TOTAL_TOKEN: &str = "{total}";

/// Expand page tokens in a slot template
pub fn expand(template: &str, page_number: u32, total_pages: usize) -> String {
    if !template.contains('{') {
        return template.to_string();
    }
    template
        .replace(PAGE_TOKEN, &page_number.to_string())
        .replace(TOTAL_TOKEN, &total_pages.to_string())
}
