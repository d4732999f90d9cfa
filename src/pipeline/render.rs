//! Page template rendering.
//!
//! Every file under a page directory is a template. Its identifier is its
//! path relative to that directory (`blog/post.html`), resolved against the
//! search paths in order, so pages can `{% extends %}` or `{% include %}`
//! shared layouts from the component directories.
//!
//! Rendering is strict: a reference to a name missing from the context fails
//! the build instead of producing an empty substitution.

use super::{ArtifactSet, BuildError, collect_files, context::RenderContext, map_path};
use crate::log;
use minijinja::{Environment, ErrorKind, UndefinedBehavior};
use std::{
    fs,
    path::{Component, Path, PathBuf},
};

/// Create the template environment used for one build.
///
/// HTML auto-escaping follows the template extension (`.html`, `.htm`,
/// `.xml`), and trailing newlines are kept so output matches the template
/// byte for byte.
pub fn create_environment(search_paths: Vec<PathBuf>) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_keep_trailing_newline(true);
    env.set_loader(move |name| load_template(&search_paths, name));
    env
}

/// Look `name` up in each search path; the first match wins.
fn load_template(search_paths: &[PathBuf], name: &str) -> Result<Option<String>, minijinja::Error> {
    let Some(relative) = safe_relative_path(name) else {
        return Ok(None);
    };

    for dir in search_paths {
        let path = dir.join(&relative);
        if path.is_file() {
            return fs::read_to_string(&path).map(Some).map_err(|err| {
                minijinja::Error::new(
                    ErrorKind::InvalidOperation,
                    format!("could not read template `{}`", path.display()),
                )
                .with_source(err)
            });
        }
    }
    Ok(None)
}

/// Turn a `/`-separated template name into a relative path.
///
/// Returns `None` for names that would leave the search root.
fn safe_relative_path(name: &str) -> Option<PathBuf> {
    let mut path = PathBuf::new();
    for segment in name.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            _ if segment.contains('\\') => return None,
            _ => path.push(segment),
        }
    }
    (!path.as_os_str().is_empty()).then_some(path)
}

/// Template identifier of `file` inside `root`, always `/`-separated.
fn template_name(root: &Path, file: &Path) -> Result<String, BuildError> {
    let relative = file
        .strip_prefix(root)
        .map_err(|_| BuildError::OutsideRoot {
            path: file.to_path_buf(),
            root: root.to_path_buf(),
        })?;

    let segments: Vec<_> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect();
    Ok(segments.join("/"))
}

/// Render every template under `source_dirs` into `dest_root`.
///
/// Fails fast: the first missing template, undefined variable or write error
/// aborts the phase. Files written before the failure are left in place.
pub fn render_pages(
    source_dirs: &[PathBuf],
    search_paths: &[PathBuf],
    context: &RenderContext,
    dest_root: &Path,
) -> Result<ArtifactSet, BuildError> {
    let env = create_environment(search_paths.to_vec());
    let ctx = context.to_value();
    let mut artifacts = ArtifactSet::new();

    for dir in source_dirs {
        for src in collect_files(dir)? {
            let dst = map_path(dir, &src, dest_root)?;
            let name = template_name(dir, &src)?;
            artifacts.insert(dst.clone(), src.clone())?;

            let rendered = env
                .get_template(&name)
                .and_then(|template| template.render(&ctx))
                .map_err(|err| BuildError::from_template(&name, err))?;

            if let Some(parent) = dst.parent() {
                fs::create_dir_all(parent).map_err(|err| BuildError::io(parent, err))?;
            }
            fs::write(&dst, rendered).map_err(|err| BuildError::io(&dst, err))?;
            log!("render"; "{}", src.display());
        }
    }

    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Site {
        _dir: TempDir,
        pages: PathBuf,
        components: PathBuf,
        dest: PathBuf,
    }

    impl Site {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let pages = dir.path().join("pages");
            let components = dir.path().join("components");
            fs::create_dir_all(&pages).unwrap();
            fs::create_dir_all(&components).unwrap();
            let dest = dir.path().join("dist");
            Self {
                _dir: dir,
                pages,
                components,
                dest,
            }
        }

        fn page(&self, name: &str, body: &str) -> &Self {
            let path = self.pages.join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, body).unwrap();
            self
        }

        fn component(&self, name: &str, body: &str) -> &Self {
            fs::write(self.components.join(name), body).unwrap();
            self
        }

        fn render(&self, context: &RenderContext) -> Result<ArtifactSet, BuildError> {
            render_pages(
                &[self.pages.clone()],
                &[self.pages.clone(), self.components.clone()],
                context,
                &self.dest,
            )
        }
    }

    fn context() -> RenderContext {
        let mut ctx = RenderContext::new();
        ctx.insert("commit_date", "2024-01-01T00:00:00");
        ctx
    }

    #[test]
    fn test_safe_relative_path() {
        assert_eq!(
            safe_relative_path("blog/post.html"),
            Some(PathBuf::from("blog").join("post.html"))
        );
        assert_eq!(safe_relative_path("./a.html"), Some(PathBuf::from("a.html")));
        assert_eq!(safe_relative_path("../secret.html"), None);
        assert_eq!(safe_relative_path("a/../../b.html"), None);
        assert_eq!(safe_relative_path(""), None);
    }

    #[test]
    fn test_template_name_uses_forward_slashes() {
        let name = template_name(
            Path::new("/site/pages"),
            &Path::new("/site/pages").join("blog").join("post.html"),
        )
        .unwrap();
        assert_eq!(name, "blog/post.html");
    }

    #[test]
    fn test_render_with_layout_inheritance() {
        let site = Site::new();
        site.component(
            "base.html",
            "<html><body>{% block content %}{% endblock %}<footer>{{ commit_date }}</footer></body></html>",
        )
        .page(
            "index.html",
            "{% extends \"base.html\" %}{% block content %}<h1>Home</h1>{% endblock %}",
        );

        let artifacts = site.render(&context()).unwrap();
        let out = site.dest.join("index.html");
        assert!(artifacts.contains(&out));
        assert_eq!(
            fs::read_to_string(out).unwrap(),
            "<html><body><h1>Home</h1><footer>2024-01-01T00:00:00</footer></body></html>"
        );
    }

    #[test]
    fn test_render_nested_page_and_include() {
        let site = Site::new();
        site.component("nav.html", "<nav>{{ commit_date }}</nav>")
            .page("blog/post.html", "{% include \"nav.html\" %}<p>post</p>");

        site.render(&context()).unwrap();
        assert_eq!(
            fs::read_to_string(site.dest.join("blog/post.html")).unwrap(),
            "<nav>2024-01-01T00:00:00</nav><p>post</p>"
        );
    }

    #[test]
    fn test_render_keeps_trailing_newline() {
        let site = Site::new();
        site.page("a.html", "<p>{{ commit_date }}</p>\n");

        site.render(&context()).unwrap();
        assert_eq!(
            fs::read_to_string(site.dest.join("a.html")).unwrap(),
            "<p>2024-01-01T00:00:00</p>\n"
        );
    }

    #[test]
    fn test_render_escapes_html() {
        let site = Site::new();
        site.page("a.html", "{{ title }}");
        let mut ctx = RenderContext::new();
        ctx.insert("title", "<b>&</b>");

        site.render(&ctx).unwrap();
        assert_eq!(
            fs::read_to_string(site.dest.join("a.html")).unwrap(),
            "&lt;b&gt;&amp;&lt;&#x2f;b&gt;"
        );
    }

    #[test]
    fn test_render_undefined_variable_fails() {
        let site = Site::new();
        site.page("index.html", "<p>{{ missing_value }}</p>");

        let err = site.render(&context()).unwrap_err();
        assert!(matches!(err, BuildError::UndefinedVariable { ref name, .. } if name == "index.html"));
        assert!(!site.dest.join("index.html").exists());
    }

    #[test]
    fn test_render_missing_layout_fails() {
        let site = Site::new();
        site.page("index.html", "{% extends \"missing.html\" %}");

        assert!(matches!(
            site.render(&context()),
            Err(BuildError::TemplateNotFound { .. })
        ));
    }

    #[test]
    fn test_render_missing_source_dir() {
        let site = Site::new();
        let missing = site.pages.join("nope");
        let err = render_pages(&[missing], &[], &context(), &site.dest).unwrap_err();
        assert!(matches!(err, BuildError::SourceNotFound(_)));
    }

    #[test]
    fn test_render_duplicate_across_page_dirs() {
        let site = Site::new();
        site.page("index.html", "a");
        fs::write(site.components.join("index.html"), "b").unwrap();

        let err = render_pages(
            &[site.pages.clone(), site.components.clone()],
            &[site.pages.clone(), site.components.clone()],
            &context(),
            &site.dest,
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::DuplicateArtifact { .. }));
    }

    #[test]
    fn test_loader_rejects_parent_escape() {
        let site = Site::new();
        site.page("index.html", "{% include \"../components/x.html\" %}");
        site.component("x.html", "x");

        assert!(matches!(
            site.render(&context()),
            Err(BuildError::TemplateNotFound { .. })
        ));
    }
}
