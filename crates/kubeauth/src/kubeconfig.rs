//! Kubeconfig document rendering.

use crate::error::Result;
use crate::types::ClusterCredential;
use serde::Serialize;

const EXEC_API_VERSION: &str = "client.authentication.k8s.io/v1beta1";

#[derive(Serialize)]
struct Document<'a> {
    #[serde(rename = "apiVersion")]
    api_version: &'static str,
    kind: &'static str,
    clusters: Vec<NamedCluster<'a>>,
    contexts: Vec<NamedContext<'a>>,
    #[serde(rename = "current-context")]
    current_context: &'a str,
    users: Vec<NamedUser<'a>>,
}

#[derive(Serialize)]
struct NamedCluster<'a> {
    name: &'a str,
    cluster: Cluster<'a>,
}

#[derive(Serialize)]
struct Cluster<'a> {
    server: &'a str,
    #[serde(rename = "certificate-authority-data")]
    certificate_authority_data: &'a str,
}

#[derive(Serialize)]
struct NamedContext<'a> {
    name: &'a str,
    context: Context<'a>,
}

#[derive(Serialize)]
struct Context<'a> {
    cluster: &'a str,
    user: &'a str,
}

#[derive(Serialize)]
struct NamedUser<'a> {
    name: &'a str,
    user: User<'a>,
}

#[derive(Serialize)]
struct User<'a> {
    exec: Exec<'a>,
}

#[derive(Serialize)]
struct Exec<'a> {
    #[serde(rename = "apiVersion")]
    api_version: &'static str,
    command: &'static str,
    args: Vec<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    env: Vec<EnvVar<'a>>,
}

#[derive(Serialize)]
struct EnvVar<'a> {
    name: &'static str,
    value: &'a str,
}

/// Arguments for the `aws eks get-token` exec helper.
fn token_args(credential: &ClusterCredential) -> Vec<&str> {
    let mut args = vec!["eks", "get-token", "--cluster-name", credential.cluster_name.as_str()];
    if !credential.region.is_empty() {
        args.push("--region");
        args.push(credential.region.as_str());
    }
    args
}

/// Render a kubeconfig whose single user authenticates through
/// `aws eks get-token`.
///
/// Cluster, context and user all share the cluster name. `AWS_PROFILE` is
/// passed to the helper only when a profile is set.
pub fn render(credential: &ClusterCredential) -> Result<String> {
    let name = credential.cluster_name.as_str();

    let env = if credential.aws_profile.is_empty() {
        Vec::new()
    } else {
        vec![EnvVar {
            name: "AWS_PROFILE",
            value: &credential.aws_profile,
        }]
    };

    let document = Document {
        api_version: "v1",
        kind: "Config",
        clusters: vec![NamedCluster {
            name,
            cluster: Cluster {
                server: &credential.endpoint,
                certificate_authority_data: &credential.ca_data,
            },
        }],
        contexts: vec![NamedContext {
            name,
            context: Context {
                cluster: name,
                user: name,
            },
        }],
        current_context: name,
        users: vec![NamedUser {
            name,
            user: User {
                exec: Exec {
                    api_version: EXEC_API_VERSION,
                    command: "aws",
                    args: token_args(credential),
                    env,
                },
            },
        }],
    };

    Ok(serde_yaml::to_string(&document)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Value;

    fn credential(profile: &str) -> ClusterCredential {
        ClusterCredential {
            cluster_name: "test-cluster".to_string(),
            region: "us-west-2".to_string(),
            endpoint: "https://ABC123.gr7.us-west-2.eks.amazonaws.com".to_string(),
            ca_data: "LS0tLS1CRUdJTiBDRVJUSUZJQ0FURS0tLS0t".to_string(),
            aws_profile: profile.to_string(),
        }
    }

    fn exec(doc: &Value) -> &Value {
        &doc["users"][0]["user"]["exec"]
    }

    #[test]
    fn test_render_end_to_end() {
        let yaml = render(&credential("my-profile")).unwrap();
        let doc: Value = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(doc["apiVersion"], "v1");
        assert_eq!(doc["kind"], "Config");
        assert_eq!(doc["current-context"], "test-cluster");

        let cluster = &doc["clusters"][0];
        assert_eq!(cluster["name"], "test-cluster");
        assert_eq!(
            cluster["cluster"]["server"],
            "https://ABC123.gr7.us-west-2.eks.amazonaws.com"
        );
        assert_eq!(
            cluster["cluster"]["certificate-authority-data"],
            "LS0tLS1CRUdJTiBDRVJUSUZJQ0FURS0tLS0t"
        );

        let context = &doc["contexts"][0];
        assert_eq!(context["context"]["cluster"], "test-cluster");
        assert_eq!(context["context"]["user"], "test-cluster");

        let exec = exec(&doc);
        assert_eq!(exec["apiVersion"], "client.authentication.k8s.io/v1beta1");
        assert_eq!(exec["command"], "aws");
        assert_eq!(exec["env"][0]["name"], "AWS_PROFILE");
        assert_eq!(exec["env"][0]["value"], "my-profile");
    }

    #[test]
    fn test_no_profile_no_env() {
        let yaml = render(&credential("")).unwrap();
        let doc: Value = serde_yaml::from_str(&yaml).unwrap();

        assert!(exec(&doc).get("env").is_none());
        assert!(!yaml.contains("AWS_PROFILE"));
    }

    #[test]
    fn test_token_args() {
        let yaml = render(&credential("")).unwrap();
        let doc: Value = serde_yaml::from_str(&yaml).unwrap();
        let args: Vec<&str> = exec(&doc)["args"]
            .as_sequence()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();

        assert_eq!(
            args,
            vec!["eks", "get-token", "--cluster-name", "test-cluster", "--region", "us-west-2"]
        );
    }

    #[test]
    fn test_token_args_without_region() {
        let mut cred = credential("");
        cred.region = String::new();

        assert_eq!(
            token_args(&cred),
            vec!["eks", "get-token", "--cluster-name", "test-cluster"]
        );
    }
}
