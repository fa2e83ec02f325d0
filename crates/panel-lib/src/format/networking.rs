use super::{created_at, namespace_of, or_na, NOT_AVAILABLE};
use crate::objects::{Ingress, Service, ServicePort};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSummary {
    pub name: String,
    pub namespace: String,
    #[serde(rename = "type")]
    pub service_type: String,
    pub cluster_ip: String,
    pub ports: Vec<String>,
    pub created_at: String,
}

/// `port/protocol`, or `port:nodePort/protocol` when a node port is assigned
fn format_port(port: &ServicePort) -> String {
    let protocol = port.protocol.as_deref().unwrap_or("TCP");
    let number = port.port.unwrap_or(0);
    match port.node_port {
        Some(node_port) => format!("{}:{}/{}", number, node_port, protocol),
        None => format!("{}/{}", number, protocol),
    }
}

pub fn format_service(service: &Service) -> ServiceSummary {
    ServiceSummary {
        name: service.metadata.name_or_empty(),
        namespace: namespace_of(&service.metadata),
        service_type: service
            .spec
            .type_
            .clone()
            .unwrap_or_else(|| "ClusterIP".to_string()),
        cluster_ip: or_na(service.spec.cluster_ip.as_ref()),
        ports: service.spec.ports.iter().map(format_port).collect(),
        created_at: created_at(&service.metadata),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressSummary {
    pub name: String,
    pub namespace: String,
    pub class: String,
    pub hosts: Vec<String>,
    pub address: String,
    pub created_at: String,
}

pub fn format_ingress(ingress: &Ingress) -> IngressSummary {
    let address = ingress
        .status
        .load_balancer
        .ingress
        .iter()
        .find_map(|lb| lb.ip.clone().or_else(|| lb.hostname.clone()))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    IngressSummary {
        name: ingress.metadata.name_or_empty(),
        namespace: namespace_of(&ingress.metadata),
        class: or_na(ingress.spec.ingress_class_name.as_ref()),
        hosts: ingress
            .spec
            .rules
            .iter()
            .map(|rule| rule.host.clone().unwrap_or_else(|| "*".to_string()))
            .collect(),
        address,
        created_at: created_at(&ingress.metadata),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_service_defaults() {
        let service: Service = serde_json::from_value(json!({
            "metadata": {"name": "headless"},
            "spec": {}
        }))
        .unwrap();

        let summary = format_service(&service);
        assert_eq!(summary.service_type, "ClusterIP");
        assert_eq!(summary.cluster_ip, "N/A");
        assert!(summary.ports.is_empty());
        assert_eq!(summary.namespace, "default");
    }

    #[test]
    fn test_service_ports() {
        let service: Service = serde_json::from_value(json!({
            "metadata": {"name": "web", "namespace": "shop"},
            "spec": {
                "type": "NodePort",
                "clusterIP": "10.152.183.10",
                "ports": [
                    {"port": 80, "nodePort": 30080, "protocol": "TCP"},
                    {"port": 53, "protocol": "UDP"},
                    {"port": 443}
                ]
            }
        }))
        .unwrap();

        let summary = format_service(&service);
        assert_eq!(summary.service_type, "NodePort");
        assert_eq!(summary.cluster_ip, "10.152.183.10");
        assert_eq!(summary.ports, vec!["80:30080/TCP", "53/UDP", "443/TCP"]);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["type"], "NodePort");
        assert_eq!(json["clusterIp"], "10.152.183.10");
    }

    #[test]
    fn test_ingress_fields_and_defaults() {
        let ingress: Ingress = serde_json::from_value(json!({
            "metadata": {"name": "shop", "namespace": "shop"},
            "spec": {
                "ingressClassName": "public",
                "rules": [{"host": "shop.example.com"}, {}]
            },
            "status": {"loadBalancer": {"ingress": [{"hostname": "lb.example.com"}]}}
        }))
        .unwrap();

        let summary = format_ingress(&ingress);
        assert_eq!(summary.class, "public");
        assert_eq!(summary.hosts, vec!["shop.example.com", "*"]);
        assert_eq!(summary.address, "lb.example.com");

        let bare = format_ingress(&Ingress::default());
        assert_eq!(bare.class, "N/A");
        assert_eq!(bare.address, "N/A");
    }
}
