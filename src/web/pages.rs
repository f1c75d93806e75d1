use crate::reconcile::{AuditOutcome, ReconcileSummary};
use crate::stock::{NewPurchase, NewSale, StockItem};

/// Minimal HTML escaping for text and attribute values.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · phonestock</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
<nav>
  <a href="/">Home</a>
  <a href="/add_purchase">Add Purchase</a>
  <a href="/add_sale">Add Sale</a>
  <a href="/view_stock">View Stock</a>
  <a href="/audit">Audit</a>
</nav>
<main>
<h1>{title}</h1>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
        body = body
    )
}

fn error_banner(error: Option<&str>) -> String {
    match error {
        Some(msg) => format!(r#"<p class="error">{}</p>"#, escape(msg)),
        None => String::new(),
    }
}

fn text_input(out: &mut String, name: &str, label: &str, value: &str, input_type: &str) {
    out.push_str(&format!(
        "<label>{label}<input type=\"{input_type}\" name=\"{name}\" value=\"{value}\" required></label>\n",
        label = escape(label),
        input_type = input_type,
        name = name,
        value = escape(value)
    ));
}

pub fn index() -> String {
    let body = r#"<ul class="menu">
  <li><a href="/add_purchase">Record a purchase</a></li>
  <li><a href="/add_sale">Record a sale</a></li>
  <li><a href="/view_stock">View stock</a></li>
  <li><a href="/export_stock">Export stock to Excel</a></li>
  <li><a href="/audit">Audit scan</a></li>
  <li><a href="/export_audit">Export audit report to Excel</a></li>
</ul>"#;
    layout("Mobile Stock", body)
}

/// Purchase form, pre-filled with `values` when re-rendered after an error.
pub fn purchase_form(values: &NewPurchase, error: Option<&str>) -> String {
    let mut form = error_banner(error);
    form.push_str("<form method=\"post\" action=\"/add_purchase\">\n");
    text_input(&mut form, "imei", "IMEI", &values.imei, "text");
    text_input(&mut form, "product", "Product", &values.product, "text");
    text_input(&mut form, "company", "Company", &values.company, "text");
    text_input(&mut form, "model", "Model", &values.model, "text");
    text_input(&mut form, "specification", "Specification", &values.specification, "text");
    text_input(&mut form, "purchase_date", "Purchase Date", &values.purchase_date, "date");
    text_input(&mut form, "received_from", "Received From", &values.received_from, "text");
    form.push_str("<button type=\"submit\">Save Purchase</button>\n</form>");
    layout("Add Purchase", &form)
}

pub fn sale_form(values: &NewSale, error: Option<&str>) -> String {
    let mut form = error_banner(error);
    form.push_str("<form method=\"post\" action=\"/add_sale\">\n");
    text_input(&mut form, "imei", "IMEI", &values.imei, "text");
    text_input(&mut form, "sold_to", "Sold To", &values.sold_to, "text");
    text_input(&mut form, "sold_date", "Sold Date", &values.sold_date, "date");
    form.push_str("<button type=\"submit\">Save Sale</button>\n</form>");
    layout("Add Sale", &form)
}

const STOCK_COLUMNS: [&str; 11] = [
    "IMEI",
    "Product",
    "Company",
    "Model",
    "Specification",
    "Purchase Date",
    "Received From",
    "Purchase Amount",
    "Status",
    "Sold To",
    "Sold Date",
];

fn header_row(out: &mut String, columns: &[&str]) {
    out.push_str("<thead><tr>");
    for column in columns {
        out.push_str(&format!("<th>{}</th>", escape(column)));
    }
    out.push_str("</tr></thead>\n");
}

pub fn stock_table(items: &[StockItem]) -> String {
    let mut body = format!(
        r#"<p>{} items. <a href="/export_stock">Export to Excel</a></p>"#,
        items.len()
    );
    body.push_str("\n<table class=\"stock\">\n");
    header_row(&mut body, &STOCK_COLUMNS);
    body.push_str("<tbody>\n");
    for item in items {
        body.push_str("<tr>");
        for cell in item.to_row() {
            body.push_str(&format!("<td>{}</td>", escape(&cell)));
        }
        body.push_str("</tr>\n");
    }
    body.push_str("</tbody>\n</table>");
    layout("Stock", &body)
}

/// The scanning page. Each row carries its IMEI, model and stock status as
/// data attributes for the client-side scanner in `/static/audit.js`.
pub fn audit_page(reconciled: &[(&StockItem, AuditOutcome)], summary: &ReconcileSummary) -> String {
    let mut body = String::new();
    body.push_str(&format!(
        r#"<p class="summary">Audited: <span id="count-audited">{}</span> · Sold-Found: <span id="count-sold-found">{}</span> · Missing: <span id="count-missing">{}</span> · Sold (not scanned): {} · Total: {}</p>
<form id="scan-form" autocomplete="off">
  <label>Scan IMEI<input type="text" id="scan-imei" autofocus></label>
  <button type="submit">Log Scan</button>
</form>
<p id="scan-result" role="status"></p>
<p><a href="/export_audit">Export audit report to Excel</a></p>
"#,
        summary.audited,
        summary.sold_found,
        summary.missing,
        summary.not_applicable,
        summary.total()
    ));

    body.push_str("<table class=\"audit\" id=\"audit-table\">\n");
    header_row(
        &mut body,
        &["IMEI", "Company", "Model", "Status", "Audit Status", "Audit Timestamp"],
    );
    body.push_str("<tbody>\n");
    for (item, outcome) in reconciled {
        body.push_str(&format!(
            "<tr data-imei=\"{imei}\" data-model=\"{model}\" data-status=\"{status}\"><td>{imei}</td><td>{company}</td><td>{model}</td><td>{status}</td><td class=\"audit-status\">{audit_status}</td><td class=\"audit-ts\">{audit_ts}</td></tr>\n",
            imei = escape(item.imei()),
            model = escape(item.model()),
            status = escape(item.status().as_ref()),
            company = escape(item.company()),
            audit_status = escape(outcome.status_label()),
            audit_ts = escape(outcome.timestamp()),
        ));
    }
    body.push_str("</tbody>\n</table>\n<script src=\"/static/audit.js\"></script>");
    layout("Stock Audit", &body)
}

pub fn error_page(message: &str) -> String {
    layout("Error", &error_banner(Some(message)))
}
