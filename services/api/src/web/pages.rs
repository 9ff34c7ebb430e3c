//! services/api/src/web/pages.rs
//!
//! Server-rendered HTML for the admin and public pages.
//!
//! Rendering is plain string assembly over a shared layout. User-supplied
//! values are escaped; lecture fragments are emitted verbatim since they are
//! the stored content being displayed.

use lectern_core::domain::{LectureSummary, Subject, Unit};

/// Escapes a value for interpolation into HTML text or attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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
<title>{title}</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
{body}
<script src="/static/script.js"></script>
</body>
</html>"#,
        title = escape_html(title),
        body = body
    )
}

pub fn login_page(error: Option<&str>) -> String {
    let banner = error
        .map(|e| format!(r#"<p class="error">{}</p>"#, escape_html(e)))
        .unwrap_or_default();
    layout(
        "Admin Login",
        &format!(
            r#"<main class="login">
<h1>Admin Login</h1>
{banner}
<form method="post" action="/login">
<label>Username <input type="text" name="username" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Log in</button>
</form>
</main>"#
        ),
    )
}

pub fn dashboard_page(subjects: &[Subject], error: Option<&str>) -> String {
    let banner = error
        .map(|e| format!(r#"<p class="error">{}</p>"#, escape_html(e)))
        .unwrap_or_default();
    let rows: String = subjects
        .iter()
        .map(|s| {
            format!(
                r#"<tr>
<td><a href="/admin/{code}">{name}</a></td>
<td>{code}</td>
<td>
<a href="/admin/edit-subject/{code}">Edit</a>
<form method="post" action="/admin/delete-subject/{code}" class="inline"><button type="submit">Delete</button></form>
</td>
</tr>"#,
                code = escape_html(&s.code),
                name = escape_html(&s.name),
            )
        })
        .collect();
    layout(
        "Admin Dashboard",
        &format!(
            r#"<main class="dashboard">
<h1>Subjects</h1>
<p><a href="/logout">Log out</a></p>
{banner}
<table>
<tr><th>Name</th><th>Code</th><th></th></tr>
{rows}
</table>
<h2>Add Subject</h2>
<form method="post" action="/admin/add-subject">
<label>Name <input type="text" name="subjectName" required></label>
<label>Code <input type="text" name="subjectCode" required></label>
<button type="submit">Add</button>
</form>
</main>"#
        ),
    )
}

pub fn edit_subject_page(subject: &Subject) -> String {
    let unit_inputs: String = subject
        .units
        .iter()
        .enumerate()
        .map(|(i, u)| {
            format!(
                r#"<label>Unit {n} title <input type="text" name="unit{n}_title" value="{title}"></label>"#,
                n = i + 1,
                title = escape_html(&u.title),
            )
        })
        .collect();
    layout(
        &format!("Edit {}", subject.name),
        &format!(
            r#"<main class="edit-subject">
<h1>Edit Subject</h1>
<form method="post" action="/admin/edit-subject/{code}">
<label>Name <input type="text" name="subjectName" value="{name}" required></label>
<label>Code <input type="text" name="subjectCode" value="{code}" required></label>
{unit_inputs}
<button type="submit">Save</button>
</form>
<p><a href="/admin">Back</a></p>
</main>"#,
            code = escape_html(&subject.code),
            name = escape_html(&subject.name),
        ),
    )
}

pub fn subject_admin_page(subject: &Subject, lectures: &[LectureSummary]) -> String {
    let unit_options: String = subject
        .units
        .iter()
        .map(|u| {
            format!(
                r#"<option value="{id}">{title}</option>"#,
                id = escape_html(&u.id),
                title = escape_html(&u.title),
            )
        })
        .collect();
    let lecture_rows: String = lectures
        .iter()
        .map(|l| {
            format!(
                "<li>{} <small>({})</small></li>",
                escape_html(&l.title),
                escape_html(&l.unit_id)
            )
        })
        .collect();
    layout(
        &subject.name,
        &format!(
            r#"<main class="subject-admin">
<h1>{name} <small>{code}</small></h1>
<p><a href="/admin">Back to dashboard</a></p>
<h2>Upload Lecture PDF</h2>
<form id="upload-form" method="post" action="/admin/{code}/upload" enctype="multipart/form-data">
<label>Title <input type="text" name="title" required></label>
<label>Unit <select name="unit">{unit_options}</select></label>
<label>PDF <input type="file" name="pdfFile" accept="application/pdf" required></label>
<button type="submit">Generate Lecture</button>
</form>
<h2>Lectures</h2>
<ul>{lecture_rows}</ul>
</main>"#,
            name = escape_html(&subject.name),
            code = escape_html(&subject.code),
        ),
    )
}

pub fn subjects_page(entries: &[(Subject, usize)]) -> String {
    let cards: String = entries
        .iter()
        .map(|(s, count)| {
            format!(
                r#"<li><a href="/{code}"><strong>{name}</strong> <span>{code}</span> <small>{count} lectures</small></a></li>"#,
                code = escape_html(&s.code),
                name = escape_html(&s.name),
                count = count,
            )
        })
        .collect();
    layout(
        "Subjects",
        &format!(
            r#"<main class="subjects">
<h1>Subjects</h1>
<ul class="subject-list">{cards}</ul>
</main>"#
        ),
    )
}

pub fn lecture_page(
    subject: &Subject,
    grouped: &[(&Unit, Vec<LectureSummary>)],
    current_lecture_id: &str,
    current_lecture_html: &str,
) -> String {
    let sidebar: String = grouped
        .iter()
        .map(|(unit, lectures)| {
            let links: String = lectures
                .iter()
                .map(|l| {
                    let active = if l.lecture_id == current_lecture_id {
                        " active"
                    } else {
                        ""
                    };
                    format!(
                        r#"<li><a class="lecture-link{active}" href="/{code}/lectures/{id}">{title}</a></li>"#,
                        code = escape_html(&subject.code),
                        id = escape_html(&l.lecture_id),
                        title = escape_html(&l.title),
                    )
                })
                .collect();
            format!(
                r#"<div class="unit">
<button type="button" class="unit-btn">{title} ▾</button>
<ul>{links}</ul>
</div>"#,
                title = escape_html(&unit.title),
            )
        })
        .collect();
    layout(
        &subject.name,
        &format!(
            r#"<div class="reader">
<aside class="sidebar">
<h2><a href="/">{name}</a></h2>
{sidebar}
</aside>
<main class="lecture">
{current_lecture_html}
</main>
</div>"#,
            name = escape_html(&subject.name),
        ),
    )
}

pub fn not_found_page(message: &str) -> String {
    layout(
        "Not Found",
        &format!(
            r#"<main class="not-found"><h1>404</h1><p>{}</p><p><a href="/">Back to subjects</a></p></main>"#,
            escape_html(message)
        ),
    )
}

/// Placeholder body shown before any lecture is selected or created.
pub fn welcome_fragment(subject_name: &str) -> String {
    format!(
        "<h2>Welcome to {}</h2><p>Select a lecture from the sidebar to begin.</p>",
        escape_html(subject_name)
    )
}

/// Placeholder body for an unknown lecture id under a known subject.
pub fn lecture_missing_fragment() -> &'static str {
    "<h2>Lecture Not Found</h2>"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escaping_covers_html_metacharacters() {
        assert_eq!(
            escape_html(r#"<b>"a" & 'b'</b>"#),
            "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn login_page_shows_the_error_banner() {
        assert!(login_page(Some("Invalid credentials")).contains("Invalid credentials"));
        assert!(!login_page(None).contains("class=\"error\""));
    }

    #[test]
    fn lecture_page_marks_the_active_lecture() {
        let subject = Subject {
            code: "MA101".into(),
            name: "Maths".into(),
            units: lectern_core::default_units(),
        };
        let summaries = vec![LectureSummary {
            lecture_id: "limits".into(),
            title: "Limits".into(),
            unit_id: "unit1".into(),
        }];
        let grouped = lectern_core::group_by_unit(&subject.units, &summaries);
        let html = lecture_page(&subject, &grouped, "limits", "<h1>Limits</h1>");
        assert!(html.contains("lecture-link active"));
        assert!(html.contains("/MA101/lectures/limits"));
        assert!(html.contains("<h1>Limits</h1>"));
    }
}
