use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Breadcrumb {
    pub name: String,
    pub url: String,
}

/// `Home` followed by one crumb per path segment, each linking to the
/// accumulated path.
pub fn build_breadcrumbs(path: Option<&str>) -> Vec<Breadcrumb> {
    let mut breadcrumbs = vec![Breadcrumb {
        name: "Home".to_string(),
        url: "/docs".to_string(),
    }];

    let Some(path) = path.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty()) else {
        return breadcrumbs;
    };

    let mut accumulated: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        accumulated.push(segment);
        breadcrumbs.push(Breadcrumb {
            name: segment.to_string(),
            url: doc_url(&accumulated.join("/")),
        });
    }
    breadcrumbs
}

/// Percent-encode each segment of a document path, keeping the slashes.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

pub fn doc_url(path: &str) -> String {
    format!("/docs/{}", encode_path(path))
}

pub fn folder_delete_url(path: &str) -> String {
    format!("/folders/{}/delete", encode_path(path))
}
