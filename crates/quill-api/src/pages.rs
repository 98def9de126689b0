//! Server-rendered pages. The markup is deliberately tiny; the app has no
//! client-side code and no template engine, just escaped string assembly.

use axum::response::Html;

use quill_db::models::{PostRow, UserRow};

pub fn index(user: Option<&UserRow>, posts: &[PostRow]) -> Html<String> {
    let mut items = String::new();
    for post in posts {
        let about = format!(
            "by {} on {}",
            escape(&post.author_username),
            post.created.get(..10).unwrap_or(&post.created)
        );
        let edit = match user {
            Some(u) if u.id == post.author_id => {
                format!(r#"<a class="action" href="/{}/update">Edit</a>"#, post.id)
            }
            _ => String::new(),
        };
        items.push_str(&format!(
            "<article class=\"post\">\n\
             <header><h1>{}</h1><div class=\"about\">{about}</div>{edit}</header>\n\
             <p class=\"body\">{}</p>\n\
             </article>\n",
            escape(&post.title),
            escape(&post.body),
        ));
    }

    let new_link = if user.is_some() {
        r#"<a class="action" href="/create">New</a>"#
    } else {
        ""
    };

    layout("Posts", user, None, &format!("{new_link}\n{items}"))
}

pub fn register(flash: Option<&str>) -> Html<String> {
    let form = "<form method=\"post\">\n\
                <label for=\"username\">Username</label>\n\
                <input name=\"username\" id=\"username\" required>\n\
                <label for=\"password\">Password</label>\n\
                <input type=\"password\" name=\"password\" id=\"password\" required>\n\
                <input type=\"submit\" value=\"Register\">\n\
                </form>";
    layout("Register", None, flash, form)
}

pub fn login(flash: Option<&str>) -> Html<String> {
    let form = "<form method=\"post\">\n\
                <label for=\"username\">Username</label>\n\
                <input name=\"username\" id=\"username\" required>\n\
                <label for=\"password\">Password</label>\n\
                <input type=\"password\" name=\"password\" id=\"password\" required>\n\
                <input type=\"submit\" value=\"Log In\">\n\
                </form>";
    layout("Log In", None, flash, form)
}

pub fn create(user: &UserRow, flash: Option<&str>) -> Html<String> {
    layout("New Post", Some(user), flash, &post_form("", "", None))
}

pub fn update(user: &UserRow, post: &PostRow, flash: Option<&str>) -> Html<String> {
    let title = format!("Edit \"{}\"", escape(&post.title));
    layout(
        &title,
        Some(user),
        flash,
        &post_form(&post.title, &post.body, Some(post.id)),
    )
}

fn post_form(title: &str, body: &str, delete_id: Option<i64>) -> String {
    let delete = match delete_id {
        Some(id) => format!(
            "<form action=\"/{id}/delete\" method=\"post\">\n\
             <input class=\"danger\" type=\"submit\" value=\"Delete\" \
             onclick=\"return confirm('Are you sure?');\">\n\
             </form>"
        ),
        None => String::new(),
    };
    format!(
        "<form method=\"post\">\n\
         <label for=\"title\">Title</label>\n\
         <input name=\"title\" id=\"title\" value=\"{}\" required>\n\
         <label for=\"body\">Body</label>\n\
         <textarea name=\"body\" id=\"body\">{}</textarea>\n\
         <input type=\"submit\" value=\"Save\">\n\
         </form>\n{delete}",
        escape(title),
        escape(body),
    )
}

fn layout(title: &str, user: Option<&UserRow>, flash: Option<&str>, content: &str) -> Html<String> {
    let nav = match user {
        Some(u) => format!(
            r#"<span>{}</span> <a href="/auth/logout">Log Out</a>"#,
            escape(&u.username)
        ),
        None => r#"<a href="/auth/register">Register</a> <a href="/auth/login">Log In</a>"#
            .to_string(),
    };
    let flash = match flash {
        Some(msg) => format!("<div class=\"flash\">{}</div>\n", escape(msg)),
        None => String::new(),
    };
    Html(format!(
        "<!doctype html>\n\
         <html>\n\
         <head><title>{title} - Quill</title></head>\n\
         <body>\n\
         <nav><h1><a href=\"/\">Quill</a></h1>{nav}</nav>\n\
         <section class=\"content\">\n\
         <header><h1>{title}</h1></header>\n\
         {flash}{content}\n\
         </section>\n\
         </body>\n\
         </html>\n"
    ))
}

/// Escape text interpolated into markup.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, username: &str) -> UserRow {
        UserRow {
            id,
            username: username.into(),
            password: "hash".into(),
        }
    }

    fn post(id: i64, author_id: i64) -> PostRow {
        PostRow {
            id,
            author_id,
            author_username: "test".into(),
            created: "2018-01-01 00:00:00".into(),
            title: "test title".into(),
            body: "test\nbody".into(),
        }
    }

    #[test]
    fn index_shows_edit_link_to_the_author_only() {
        let posts = [post(1, 1)];

        let Html(owner_view) = index(Some(&user(1, "test")), &posts);
        assert!(owner_view.contains("href=\"/1/update\""));

        let Html(other_view) = index(Some(&user(2, "other")), &posts);
        assert!(!other_view.contains("href=\"/1/update\""));

        let Html(anon_view) = index(None, &posts);
        assert!(!anon_view.contains("href=\"/1/update\""));
    }

    #[test]
    fn index_nav_follows_login_state() {
        let Html(anon) = index(None, &[]);
        assert!(anon.contains("Log In"));
        assert!(anon.contains("Register"));

        let Html(logged_in) = index(Some(&user(1, "test")), &[]);
        assert!(logged_in.contains("Log Out"));
        assert!(logged_in.contains("test"));
    }

    #[test]
    fn post_text_is_escaped() {
        let mut p = post(1, 1);
        p.title = "<script>alert(1)</script>".into();

        let Html(page) = index(None, &[p]);
        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;"));
    }

    #[test]
    fn update_prefills_current_values() {
        let Html(page) = update(&user(1, "test"), &post(1, 1), None);
        assert!(page.contains("value=\"test title\""));
        assert!(page.contains("test\nbody"));
        assert!(page.contains("action=\"/1/delete\""));
    }

    #[test]
    fn flash_message_is_rendered() {
        let Html(page) = register(Some("Username is required."));
        assert!(page.contains("Username is required."));
    }
}
