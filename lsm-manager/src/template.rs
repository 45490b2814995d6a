//! Template Engine (spec §4.4): expands a fixed set of placeholders against
//! a [`SecureApplication`] and writes the result atomically with respect to
//! the destination filename.
//!
//! No templating crate appears anywhere in the retrieved example pack; the
//! closest precedent (`bootc-sysusers`'s own hand-rolled `next_token`
//! tokenizer) hand-rolls its own parser rather than pull one in for a grammar
//! that is "just simple enough" not to need it. The grammar here follows the
//! same philosophy: scalar placeholders `@ID@` / `@ID_UNDERSCORE@`, and block
//! sections `@PATHS@...@/PATHS@` / `@PERMISSIONS@...@/PERMISSIONS@` that
//! repeat their inner text once per declared path or permission.

use std::io::Write;

use camino::Utf8Path;

use crate::error::{Error, Result};
use crate::path_type::PathType;
use crate::secure_app::SecureApplication;

/// Expansions beyond this size are treated as a runaway template rather than
/// a legitimate application (there is no legitimate reason for a single
/// application's generated sources to approach it).
const MAX_EXPANSION_BYTES: usize = 16 * 1024 * 1024;

fn path_type_name(t: PathType) -> &'static str {
    match t {
        PathType::Conf => "conf",
        PathType::Data => "data",
        PathType::Exec => "exec",
        PathType::Http => "http",
        PathType::Icon => "icon",
        PathType::Id => "id",
        PathType::Lib => "lib",
        PathType::Public => "public",
    }
}

fn expand_block<T>(
    content: &str,
    start_tag: &str,
    end_tag: &str,
    items: &[T],
    render: impl Fn(&str, &T) -> String,
) -> Result<String> {
    let mut result = String::new();
    let mut rest = content;
    loop {
        let Some(start_idx) = rest.find(start_tag) else {
            result.push_str(rest);
            break;
        };
        result.push_str(&rest[..start_idx]);
        let after_start = &rest[start_idx + start_tag.len()..];
        let Some(end_idx) = after_start.find(end_tag) else {
            return Err(Error::Template(format!("unterminated {start_tag} block")));
        };
        let inner = &after_start[..end_idx];
        for item in items {
            result.push_str(&render(inner, item));
        }
        rest = &after_start[end_idx + end_tag.len()..];
    }
    Ok(result)
}

fn expand(content: &str, sa: &SecureApplication) -> Result<String> {
    let content = expand_block(content, "@PATHS@", "@/PATHS@", sa.paths(), |inner, path| {
        inner
            .replace("@path@", &path.path)
            .replace("@path_type@", path_type_name(path.path_type))
    })?;
    let content = expand_block(
        &content,
        "@PERMISSIONS@",
        "@/PERMISSIONS@",
        sa.permissions(),
        |inner, perm| inner.replace("@permission@", perm),
    )?;
    let id = sa
        .id()
        .ok_or_else(|| Error::Template("secure application has no identifier set".to_string()))?;
    let id_underscore = sa.id_underscore().unwrap_or(id);
    let content = content
        .replace("@ID_UNDERSCORE@", id_underscore)
        .replace("@ID@", id);
    if content.len() > MAX_EXPANSION_BYTES {
        return Err(Error::Template("unbounded expansion".to_string()));
    }
    Ok(content)
}

/// Reads `src_path`, expands its placeholders against `sa`, and writes the
/// result to `dst_path` atomically with respect to visible filename: either
/// `dst_path` ends up containing the full expansion, or it is left absent.
pub fn process_template(src_path: &Utf8Path, dst_path: &Utf8Path, sa: &SecureApplication) -> Result<()> {
    let content = std::fs::read_to_string(src_path).map_err(|e| Error::io(src_path, e))?;
    let expanded = expand(&content, sa)?;
    let dir = dst_path
        .parent()
        .ok_or_else(|| Error::Template("destination path has no parent directory".to_string()))?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::io(dst_path, e))?;
    tmp.write_all(expanded.as_bytes())
        .map_err(|e| Error::io(dst_path, e))?;
    tmp.persist(dst_path)
        .map_err(|e| Error::io(dst_path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sa_demo() -> SecureApplication {
        let mut sa = SecureApplication::new();
        sa.set_id("demo").unwrap();
        sa.add_path("/usr/bin/demo", PathType::Exec).unwrap();
        sa.add_path("/etc/demo", PathType::Conf).unwrap();
        sa.add_permission("urn:AGL:permission:demo:public:p1")
            .unwrap();
        sa
    }

    #[test]
    fn test_scalar_expansion() {
        let sa = sa_demo();
        let out = expand("policy_module(@ID@, 1.0.0)\ntype @ID_UNDERSCORE@_t;\n", &sa).unwrap();
        assert_eq!(out, "policy_module(demo, 1.0.0)\ntype demo_t;\n");
    }

    #[test]
    fn test_paths_block() {
        let sa = sa_demo();
        let tmpl = "@PATHS@type @path_type@ for @path@;\n@/PATHS@";
        let out = expand(tmpl, &sa).unwrap();
        assert_eq!(
            out,
            "type exec for /usr/bin/demo;\ntype conf for /etc/demo;\n"
        );
    }

    #[test]
    fn test_permissions_block() {
        let sa = sa_demo();
        let tmpl = "@PERMISSIONS@allow @permission@;\n@/PERMISSIONS@";
        let out = expand(tmpl, &sa).unwrap();
        assert_eq!(out, "allow urn:AGL:permission:demo:public:p1;\n");
    }

    #[test]
    fn test_empty_sets_yield_empty_block() {
        let mut sa = SecureApplication::new();
        sa.set_id("demo").unwrap();
        let out = expand("@PATHS@@path@\n@/PATHS@", &sa).unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn test_unterminated_block_is_template_error() {
        let sa = sa_demo();
        assert!(matches!(
            expand("@PATHS@no end tag", &sa),
            Err(Error::Template(_))
        ));
    }

    #[test]
    fn test_process_template_atomic() {
        let dir = tempfile::tempdir().unwrap();
        let src = Utf8Path::from_path(dir.path()).unwrap().join("src.te");
        let dst = Utf8Path::from_path(dir.path()).unwrap().join("demo.te");
        std::fs::write(&src, "policy_module(@ID@, 1.0.0)\n").unwrap();
        let sa = sa_demo();
        process_template(&src, &dst, &sa).unwrap();
        assert_eq!(
            std::fs::read_to_string(&dst).unwrap(),
            "policy_module(demo, 1.0.0)\n"
        );
    }
}
