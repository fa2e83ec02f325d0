//! CLI command implementations

pub mod cluster;
pub mod manifests;
pub mod resources;

use panel_lib::ResourceKind;

/// Parse a kind given as plural (`pods`) or kind name (`Pod`, `pod`)
pub fn parse_kind(raw: &str) -> Result<ResourceKind, String> {
    ResourceKind::ALL
        .into_iter()
        .find(|k| k.plural() == raw || k.kind().eq_ignore_ascii_case(raw))
        .ok_or_else(|| {
            let known: Vec<&str> = ResourceKind::ALL.iter().map(|k| k.plural()).collect();
            format!("unknown kind `{}` (expected one of: {})", raw, known.join(", "))
        })
}

/// Panel path of a single object; the namespace only applies to namespaced kinds
pub fn item_path(kind: ResourceKind, namespace: &str, name: &str) -> String {
    if kind.namespaced() {
        format!("kube/{}/{}/{}", kind.plural(), namespace, name)
    } else {
        format!("kube/{}/{}", kind.plural(), name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind_accepts_plural_and_kind() {
        assert_eq!(parse_kind("pods"), Ok(ResourceKind::Pod));
        assert_eq!(parse_kind("Deployment"), Ok(ResourceKind::Deployment));
        assert_eq!(parse_kind("ingress"), Ok(ResourceKind::Ingress));
        assert!(parse_kind("secrets").unwrap_err().contains("unknown kind"));
    }

    #[test]
    fn test_item_path() {
        assert_eq!(item_path(ResourceKind::Pod, "shop", "web-0"), "kube/pods/shop/web-0");
        assert_eq!(item_path(ResourceKind::Node, "shop", "cp-1"), "kube/nodes/cp-1");
    }
}
