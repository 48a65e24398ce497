use crate::collectors::DashboardData;
use crate::config::Config;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use std::fmt::Write;

/// Escapes a value for embedding in HTML text or attribute position.
/// Every host- or user-influenced string crosses this boundary.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn urlencode(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

pub fn render_dashboard(data: &DashboardData, cfg: &Config) -> String {
    let mut page = String::with_capacity(16 * 1024);
    page.push_str(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>Devdash</title>\n\
         <script src=\"https://cdn.tailwindcss.com\"></script>\n\
         <style>body { font-family: 'Inter', sans-serif; }</style>\n\
         </head>\n\
         <body class=\"bg-gray-50\">\n\
         <div class=\"min-h-screen\">\n",
    );

    render_header(&mut page, cfg);
    page.push_str("<main class=\"max-w-7xl mx-auto px-4 py-6 sm:px-6 lg:px-8\">\n");
    render_quick_actions(&mut page, cfg);
    render_system_info(&mut page, data);
    render_projects(&mut page, data);
    render_databases(&mut page, data, cfg);
    render_extensions(&mut page, data);
    page.push_str("</main>\n");
    render_footer(&mut page);

    page.push_str("</div>\n</body>\n</html>\n");
    page
}

fn render_header(page: &mut String, cfg: &Config) {
    let _ = write!(
        page,
        "<header class=\"bg-white shadow-sm\">\n\
         <div class=\"max-w-7xl mx-auto px-4 py-4 sm:px-6 lg:px-8\">\n\
         <div class=\"flex justify-between items-center\">\n\
         <h1 class=\"text-2xl font-bold text-gray-900\">Devdash</h1>\n\
         <a href=\"{docs}\" class=\"text-sm font-medium text-blue-600\" target=\"_blank\" rel=\"noopener\">Documentation &rarr;</a>\n\
         </div>\n</div>\n</header>\n",
        docs = escape_html(&cfg.docs_url),
    );
}

fn render_quick_actions(page: &mut String, cfg: &Config) {
    let _ = write!(
        page,
        "<div class=\"mb-8\">\n\
         <h2 class=\"text-lg font-medium text-gray-900 mb-4\">Quick Actions</h2>\n\
         <div class=\"grid grid-cols-1 md:grid-cols-3 gap-4\">\n\
         <a href=\"{admin}\" class=\"{card}\" target=\"_blank\"><span class=\"font-medium text-gray-700\">Database Admin</span></a>\n\
         <a href=\"?q=info\" class=\"{card}\"><span class=\"font-medium text-gray-700\">PHP Info</span></a>\n\
         <a href=\"/\" class=\"{card}\"><span class=\"font-medium text-gray-700\">Home Directory</span></a>\n\
         </div>\n</div>\n",
        admin = escape_html(&cfg.admin_url),
        card = ACTION_CARD_CLASS,
    );
}

const ACTION_CARD_CLASS: &str = "flex items-center justify-center px-4 py-3 bg-white rounded-lg shadow-sm hover:shadow-md transition-shadow border border-gray-200";

const TILE_CLASS: &str =
    "group bg-white rounded-lg shadow-sm p-4 border border-gray-200 hover:shadow-md transition-shadow";

fn render_system_info(page: &mut String, data: &DashboardData) {
    page.push_str(
        "<div class=\"mb-8\">\n\
         <h2 class=\"text-lg font-medium text-gray-900 mb-4\">System Information</h2>\n\
         <div class=\"grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-4\">\n",
    );
    for (label, value) in &data.system_info {
        let _ = write!(
            page,
            "<div class=\"bg-white rounded-lg shadow-sm p-4 border border-gray-200\">\n\
             <div class=\"text-sm font-medium text-gray-500\">{label}</div>\n\
             <div class=\"mt-1 text-lg font-semibold text-gray-900\">{value}</div>\n\
             </div>\n",
            label = escape_html(label),
            value = escape_html(value),
        );
    }
    page.push_str("</div>\n</div>\n");
}

fn render_projects(page: &mut String, data: &DashboardData) {
    page.push_str(
        "<div class=\"mb-8\">\n\
         <h2 class=\"text-lg font-medium text-gray-900 mb-4\">Projects</h2>\n\
         <div class=\"grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4\">\n",
    );
    if data.project_folders.is_empty() {
        render_notice(page, "No projects found");
    } else {
        for folder in &data.project_folders {
            let _ = write!(
                page,
                "<a href=\"/{href}\" class=\"{tile}\" target=\"_blank\">\n\
                 <span class=\"font-medium text-gray-900 group-hover:text-blue-600\">{name}</span>\n\
                 </a>\n",
                href = escape_html(folder),
                tile = TILE_CLASS,
                name = escape_html(folder),
            );
        }
    }
    page.push_str("</div>\n</div>\n");
}

fn render_databases(page: &mut String, data: &DashboardData, cfg: &Config) {
    page.push_str(
        "<div class=\"mb-8\">\n\
         <h2 class=\"text-lg font-medium text-gray-900 mb-4\">Databases</h2>\n\
         <div class=\"grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-3 gap-4\">\n",
    );
    if data.databases.is_empty() {
        render_notice(page, "No databases found");
    } else {
        for db in data.databases.values() {
            let _ = write!(
                page,
                "<a href=\"{admin}/index.php?route=/database/structure&amp;db={db_url}\" class=\"{tile}\" target=\"_blank\">\n\
                 <div class=\"flex items-center justify-between mb-2\">\n\
                 <span class=\"font-medium text-gray-900 group-hover:text-blue-600\">{name}</span>\n\
                 <span class=\"text-sm text-gray-500\">{tables} tables</span>\n\
                 </div>\n\
                 <div class=\"text-sm text-gray-500\">Size: {size:.2} MB</div>\n\
                 </a>\n",
                admin = escape_html(&cfg.admin_url),
                db_url = urlencode(&db.name),
                tile = TILE_CLASS,
                name = escape_html(&db.name),
                tables = db.table_count,
                size = db.size_megabytes,
            );
        }
    }
    page.push_str("</div>\n</div>\n");
}

fn render_extensions(page: &mut String, data: &DashboardData) {
    page.push_str(
        "<div class=\"mb-8\">\n\
         <h2 class=\"text-lg font-medium text-gray-900 mb-4\">PHP Extensions</h2>\n\
         <div class=\"bg-white rounded-lg shadow-sm border border-gray-200 overflow-hidden\">\n\
         <div class=\"grid grid-cols-2 md:grid-cols-4 lg:grid-cols-6 gap-4 p-4\">\n",
    );
    for ext in &data.loaded_extensions {
        let _ = write!(
            page,
            "<div class=\"text-sm text-gray-600 bg-gray-50 rounded px-3 py-1\">{}</div>\n",
            escape_html(ext),
        );
    }
    page.push_str("</div>\n</div>\n</div>\n");
}

fn render_notice(page: &mut String, message: &str) {
    let _ = write!(
        page,
        "<div class=\"col-span-full\">\n\
         <div class=\"bg-yellow-50 border-l-4 border-yellow-400 p-4\">\n\
         <div class=\"text-yellow-700\">{}</div>\n\
         </div>\n</div>\n",
        escape_html(message),
    );
}

fn render_footer(page: &mut String) {
    page.push_str(
        "<footer class=\"bg-white border-t border-gray-200 mt-8\">\n\
         <div class=\"max-w-7xl mx-auto py-4 px-4 sm:px-6 lg:px-8\">\n\
         <p class=\"text-center text-sm text-gray-500\">Powered by devdash</p>\n\
         </div>\n</footer>\n",
    );
}
