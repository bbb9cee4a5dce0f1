use crate::color::LOCALDOMAIN;
use crate::domain::parse_domain;
use crate::model::{Graph, NewNode, NodeType, ResourceAttrs};
use crate::record::{EventRecord, HttpUrl, Record};
use tracing::debug;

/// Longest label shown before truncation
pub const MAX_LABEL: usize = 32;

pub const DEFAULT_CLIENT: &str = "localhost";

/// Options controlling which optional node kinds get built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderOptions {
    /// Add an `ip` node per host when records carry the server address
    pub include_ip: bool,
    /// Add a `params` node for URLs with a query string
    pub include_params: bool,
    /// Client id used when a record names none
    pub default_client: String,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            include_ip: false,
            include_params: false,
            default_client: DEFAULT_CLIENT.to_string(),
        }
    }
}

/// Turns records into graph mutations.
///
/// Holds no graph of its own; every call operates on the graph passed in,
/// so swapping data sources only requires a fresh [`Graph`].
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    options: BuilderOptions,
    skipped_url: usize,
}

/// Resource path for display, shortened from the left
pub fn format_label(id: &str) -> String {
    let label = match id.find('/') {
        Some(slash) => &id[slash..],
        None => id,
    };
    let len = label.chars().count();
    if len > MAX_LABEL {
        let tail: String = label.chars().skip(len - MAX_LABEL).collect();
        format!("... {}", tail)
    } else {
        label.to_string()
    }
}

impl GraphBuilder {
    pub fn new(options: BuilderOptions) -> Self {
        Self {
            options,
            skipped_url: 0,
        }
    }

    pub fn options(&self) -> &BuilderOptions {
        &self.options
    }

    /// Records dropped because their primary URL was unusable
    pub fn skipped_url(&self) -> usize {
        self.skipped_url
    }

    /// Apply one record. Returns false when the record was dropped.
    pub fn process_record(&mut self, graph: &mut Graph, record: &Record) -> bool {
        let applied = match record {
            Record::Redirect { url, redirect_url } => process_redirect(graph, url, redirect_url),
            Record::Event(event) => self.process_event(graph, event),
        };
        if !applied {
            self.skipped_url += 1;
        }
        applied
    }

    fn process_event(&self, graph: &mut Graph, event: &EventRecord) -> bool {
        let parsed = match HttpUrl::parse(&event.url) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!("Dropping record for {}: {}", event.url, e);
                return false;
            }
        };

        let host = parsed.host.as_str();
        let domain = parse_domain(host);
        let resource_id = parsed.resource_id();

        graph.add_node(NewNode::new(&domain, NodeType::Domain, &domain));
        graph.add_node(NewNode::new(host, NodeType::Host, &domain));

        let attrs = ResourceAttrs {
            method: event.method.clone(),
            protocol: parsed.scheme.clone(),
            request_type: event.request_type.clone(),
            content_type: event.content_type.clone(),
            status_code: event.status,
            timestamp: event.ts,
            bytes: event.bytes,
            duration_ms: event.duration_ms,
        };
        graph.add_node(
            NewNode::new(&resource_id, NodeType::Resource, &domain)
                .with_label(format_label(&resource_id))
                .with_resource(attrs),
        );

        let client = event
            .client
            .as_deref()
            .unwrap_or(self.options.default_client.as_str());
        graph.add_node(NewNode::new(client, NodeType::Client, LOCALDOMAIN));

        graph.add_edge(client, &resource_id);
        graph.add_edge(&domain, host);
        graph.add_edge(host, &resource_id);

        if self.options.include_ip
            && let Some(ip) = event.ip.as_deref()
        {
            graph.add_node(NewNode::new(ip, NodeType::Ip, &domain));
            graph.add_edge(host, ip);
        }

        if self.options.include_params
            && let Some(query) = parsed.query.as_deref()
        {
            let params_id = format!("{}?{}", resource_id, query);
            graph.add_node(
                NewNode::new(&params_id, NodeType::Params, &domain).with_label(format_label(query)),
            );
            graph.add_edge(&resource_id, &params_id);
        }

        // Initiator is an origin rather than a page, so it links from the
        // host. Referer is only consulted without one.
        if let Some(initiator) = event.initiator.as_deref() {
            match HttpUrl::parse(initiator) {
                Ok(origin) => {
                    ensure_host(graph, &origin.host);
                    graph.add_edge(&origin.host, &resource_id);
                }
                Err(e) => debug!("Ignoring initiator {}: {}", initiator, e),
            }
        } else if let Some(referer) = event.referer.as_deref() {
            match HttpUrl::parse(referer) {
                Ok(page) => {
                    ensure_host(graph, &page.host);
                    let page_id = page.resource_id();
                    if graph.contains(&page_id) {
                        graph.add_edge(&page_id, &resource_id);
                    } else {
                        graph.add_edge(&page.host, &resource_id);
                    }
                }
                Err(e) => debug!("Ignoring referer {}: {}", referer, e),
            }
        }

        true
    }
}

/// Ensure domain, host and resource nodes for `url` and wire
/// `domain -> host -> resource`. Returns the resource id, or `None` when the
/// URL cannot anchor a hierarchy.
pub fn ensure_hierarchy(graph: &mut Graph, url: &str) -> Option<String> {
    let parsed = match HttpUrl::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!("No hierarchy for {}: {}", url, e);
            return None;
        }
    };

    let domain = ensure_host(graph, &parsed.host);
    let resource_id = parsed.resource_id();
    graph.add_node(
        NewNode::new(&resource_id, NodeType::Resource, &domain)
            .with_label(format_label(&resource_id)),
    );
    graph.add_edge(&parsed.host, &resource_id);
    Some(resource_id)
}

/// Returns false when neither side resolved.
fn process_redirect(graph: &mut Graph, url: &str, redirect_url: &str) -> bool {
    let source = ensure_hierarchy(graph, url);
    let target = ensure_hierarchy(graph, redirect_url);
    match (source, target) {
        (Some(source), Some(target)) => {
            graph.add_edge(&source, &target);
            true
        }
        (source, target) => source.is_some() || target.is_some(),
    }
}

/// Ensure the domain and host nodes for `host`, linked `domain -> host`.
/// Returns the domain id.
fn ensure_host(graph: &mut Graph, host: &str) -> String {
    let domain = parse_domain(host);
    graph.add_node(NewNode::new(&domain, NodeType::Domain, &domain));
    graph.add_node(NewNode::new(host, NodeType::Host, &domain));
    graph.add_edge(&domain, host);
    domain
}
