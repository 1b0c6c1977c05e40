//! In-memory subscription document.
//!
//! Wraps the DOM of a `wecutil gs <name> /f:xml` result. Reads are tolerant
//! (missing elements read as `None`); writes insert missing elements in the
//! subscription namespace at their canonical sibling position.

use chrono::{DateTime, Utc};
use xmltree::{Element, EmitterConfig, XMLNode};

use crate::error::{Error, Result};
use crate::schema::{self, ConfigurationMode, ContentFormat, TransportName};

/// A parsed subscription document.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionDocument {
    root: Element,
}

impl SubscriptionDocument {
    /// Parse subscription XML as emitted by `wecutil gs /f:xml`.
    pub fn parse(xml: &str) -> Result<Self> {
        let xml = strip_declaration(xml.trim_start_matches('\u{feff}').trim());
        let root = Element::parse(xml.as_bytes())?;
        if root.name != schema::SUBSCRIPTION {
            return Err(Error::MissingElement(schema::SUBSCRIPTION.into()));
        }
        let mut doc = Self { root };
        if let Some(query) = doc.root.get_mut_child(schema::QUERY) {
            restore_cdata(query);
        }
        Ok(doc)
    }

    /// Serialize the document with an XML declaration, indented.
    pub fn to_xml(&self) -> Result<String> {
        let mut buf = Vec::new();
        let config = EmitterConfig::new()
            .perform_indent(true)
            .write_document_declaration(true);
        self.root
            .write_with_config(&mut buf, config)
            .map_err(|e| Error::XmlWrite(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| Error::XmlWrite(e.to_string()))
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    // -----------------------------------------------------------------------
    // Generic path access
    // -----------------------------------------------------------------------

    /// Element at `path` below the root, if every step exists.
    pub fn find(&self, path: &[&str]) -> Option<&Element> {
        path.iter()
            .try_fold(&self.root, |el, name| el.get_child(*name))
    }

    pub fn contains(&self, path: &[&str]) -> bool {
        self.find(path).is_some()
    }

    /// Trimmed text content (text and CDATA) of the element at `path`.
    pub fn text(&self, path: &[&str]) -> Option<String> {
        self.find(path)
            .and_then(Element::get_text)
            .map(|t| t.trim().to_string())
    }

    pub fn attribute(&self, path: &[&str], attr: &str) -> Option<String> {
        self.find(path)
            .and_then(|el| el.attributes.get(attr))
            .map(|v| v.trim().to_string())
    }

    /// Texts of every `child` element directly below `path`.
    pub fn child_texts(&self, path: &[&str], child: &str) -> Vec<String> {
        self.find(path)
            .map(|el| {
                element_children(el)
                    .filter(|c| c.name == child)
                    .filter_map(|c| c.get_text().map(|t| t.trim().to_string()))
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Return the element at `path`, creating every missing step.
    pub fn ensure_path(&mut self, path: &[&str]) -> Result<&mut Element> {
        let mut current = &mut self.root;
        for name in path {
            current = ensure_child(current, name)?;
        }
        Ok(current)
    }

    /// Replace the text content of the element at `path`.
    pub fn set_text(&mut self, path: &[&str], value: &str) -> Result<()> {
        let el = self.ensure_path(path)?;
        replace_content(el, (!value.is_empty()).then(|| XMLNode::Text(value.to_string())));
        Ok(())
    }

    /// Replace the content of the element at `path` with a CDATA section.
    pub fn set_cdata(&mut self, path: &[&str], value: &str) -> Result<()> {
        let el = self.ensure_path(path)?;
        replace_content(el, Some(XMLNode::CData(value.to_string())));
        Ok(())
    }

    pub fn set_attribute(&mut self, path: &[&str], attr: &str, value: &str) -> Result<()> {
        let el = self.ensure_path(path)?;
        el.attributes.insert(attr.to_string(), value.to_string());
        Ok(())
    }

    /// Replace every `child` element below `path` with one element per value.
    pub fn replace_children(&mut self, path: &[&str], child: &str, values: &[String]) -> Result<()> {
        let el = self.ensure_path(path)?;
        el.children.retain(|node| match node {
            XMLNode::Element(e) => e.name != child,
            XMLNode::Text(t) => !t.trim().is_empty(),
            _ => true,
        });
        for value in values {
            let mut item = new_element(child);
            item.children.push(XMLNode::Text(value.clone()));
            el.children.push(XMLNode::Element(item));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Typed getters
    // -----------------------------------------------------------------------

    pub fn subscription_id(&self) -> Option<String> {
        self.text(&[schema::SUBSCRIPTION_ID])
    }

    pub fn subscription_type(&self) -> Option<String> {
        self.text(&[schema::SUBSCRIPTION_TYPE])
    }

    pub fn description(&self) -> Option<String> {
        self.text(&[schema::DESCRIPTION])
    }

    pub fn enabled(&self) -> Option<bool> {
        self.text(&[schema::ENABLED]).and_then(|v| parse_bool(&v))
    }

    pub fn uri(&self) -> Option<String> {
        self.text(&[schema::URI])
    }

    pub fn configuration_mode(&self) -> Option<ConfigurationMode> {
        self.text(&[schema::CONFIGURATION_MODE])
            .and_then(|v| v.parse().ok())
    }

    pub fn delivery_mode(&self) -> Option<String> {
        self.attribute(&[schema::DELIVERY], schema::ATTR_MODE)
    }

    pub fn max_items(&self) -> Option<u32> {
        self.text(&[schema::DELIVERY, schema::BATCHING, schema::MAX_ITEMS])
            .and_then(|v| v.parse().ok())
    }

    /// Maximum delivery latency in milliseconds.
    pub fn max_latency_ms(&self) -> Option<u64> {
        self.text(&[schema::DELIVERY, schema::BATCHING, schema::MAX_LATENCY_TIME])
            .and_then(|v| v.parse().ok())
    }

    /// Heartbeat interval in milliseconds.
    pub fn heartbeat_interval_ms(&self) -> Option<u64> {
        self.attribute(
            &[schema::DELIVERY, schema::PUSH_SETTINGS, schema::HEARTBEAT],
            schema::ATTR_INTERVAL,
        )
        .and_then(|v| v.parse().ok())
    }

    pub fn expires(&self) -> Option<DateTime<Utc>> {
        self.text(&[schema::EXPIRES])
            .and_then(|v| DateTime::parse_from_rfc3339(&v).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// The query list XML stored in `<Query>`.
    pub fn query(&self) -> Option<String> {
        self.text(&[schema::QUERY]).filter(|q| !q.is_empty())
    }

    pub fn read_existing_events(&self) -> Option<bool> {
        self.text(&[schema::READ_EXISTING_EVENTS])
            .and_then(|v| parse_bool(&v))
    }

    pub fn transport_name(&self) -> Option<TransportName> {
        self.text(&[schema::TRANSPORT_NAME])
            .and_then(|v| v.parse().ok())
    }

    pub fn content_format(&self) -> Option<ContentFormat> {
        self.text(&[schema::CONTENT_FORMAT])
            .and_then(|v| v.parse().ok())
    }

    pub fn locale(&self) -> Option<String> {
        self.attribute(&[schema::LOCALE], schema::ATTR_LANGUAGE)
    }

    pub fn log_file(&self) -> Option<String> {
        self.text(&[schema::LOG_FILE])
    }

    pub fn publisher_name(&self) -> Option<String> {
        self.text(&[schema::PUBLISHER_NAME])
    }

    /// SDDL string of `<AllowedSourceDomainComputers>`.
    pub fn allowed_source_domain_computers(&self) -> Option<String> {
        self.text(&[schema::ALLOWED_SOURCE_DOMAIN_COMPUTERS])
            .filter(|v| !v.is_empty())
    }

    pub fn allowed_non_domain_subjects(&self) -> Vec<String> {
        self.child_texts(
            &[
                schema::ALLOWED_SOURCE_NON_DOMAIN_COMPUTERS,
                schema::ALLOWED_SUBJECT_LIST,
            ],
            schema::SUBJECT,
        )
    }

    pub fn allowed_issuer_cas(&self) -> Vec<String> {
        self.child_texts(
            &[
                schema::ALLOWED_SOURCE_NON_DOMAIN_COMPUTERS,
                schema::ALLOWED_ISSUER_CA_LIST,
            ],
            schema::ISSUER_CA,
        )
    }
}

/// Create an element in the subscription namespace.
pub(crate) fn new_element(name: &str) -> Element {
    let mut el = Element::new(name);
    el.namespace = Some(schema::SUBSCRIPTION_NS.to_string());
    el
}

fn element_children(el: &Element) -> impl Iterator<Item = &Element> {
    el.children.iter().filter_map(XMLNode::as_element)
}

fn ensure_child<'a>(parent: &'a mut Element, name: &str) -> Result<&'a mut Element> {
    if parent.get_child(name).is_none() {
        tracing::debug!(parent = %parent.name, element = name, "inserting missing element");
        insert_child(parent, new_element(name));
    }
    parent
        .get_mut_child(name)
        .ok_or_else(|| Error::MissingElement(name.to_string()))
}

/// Insert `child` before the first sibling that follows it in schema order,
/// or append when the parent has no known order.
pub(crate) fn insert_child(parent: &mut Element, child: Element) {
    let order = schema::child_order(&parent.name);
    let rank_of = |name: &str| order.iter().position(|n| *n == name);

    let at = rank_of(&child.name)
        .and_then(|rank| {
            parent.children.iter().position(|node| {
                node.as_element()
                    .and_then(|e| rank_of(&e.name))
                    .is_some_and(|r| r > rank)
            })
        })
        .unwrap_or(parent.children.len());

    parent.children.insert(at, XMLNode::Element(child));
}

fn replace_content(el: &mut Element, content: Option<XMLNode>) {
    el.children
        .retain(|node| !matches!(node, XMLNode::Text(_) | XMLNode::CData(_)));
    if let Some(node) = content {
        el.children.push(node);
    }
}

/// The parser hands CDATA back as character data. Put a text-only element's
/// content back into a single CDATA section so it is written out unescaped.
fn restore_cdata(el: &mut Element) {
    if el.children.iter().any(|n| matches!(n, XMLNode::Element(_))) {
        return;
    }
    let text = el.get_text().map(|t| t.trim().to_string()).unwrap_or_default();
    if !text.is_empty() {
        replace_content(el, Some(XMLNode::CData(text)));
    }
}

/// Drop a leading `<?xml ...?>` declaration. Captured process output is
/// already decoded, so an `encoding="UTF-16"` declaration would mislead the
/// parser.
fn strip_declaration(xml: &str) -> &str {
    if xml.starts_with("<?xml")
        && let Some(end) = xml.find("?>")
    {
        return xml[end + 2..].trim_start();
    }
    xml
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) const SAMPLE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Subscription xmlns="http://schemas.microsoft.com/2006/03/windows/events/subscription">
	<SubscriptionId>TestSecurity</SubscriptionId>
	<SubscriptionType>SourceInitiated</SubscriptionType>
	<Description>Forward security events</Description>
	<Enabled>true</Enabled>
	<Uri>http://schemas.microsoft.com/wbem/wsman/1/windows/EventLog</Uri>
	<ConfigurationMode>Normal</ConfigurationMode>
	<Delivery Mode="Push">
		<Batching>
			<MaxItems>5</MaxItems>
			<MaxLatencyTime>900000</MaxLatencyTime>
		</Batching>
		<PushSettings>
			<Heartbeat Interval="900000"/>
		</PushSettings>
	</Delivery>
	<Query><![CDATA[<QueryList><Query Id="0"><Select Path="Security">*</Select></Query></QueryList>]]></Query>
	<ReadExistingEvents>false</ReadExistingEvents>
	<TransportName>HTTP</TransportName>
	<ContentFormat>Events</ContentFormat>
	<Locale Language="en-US"/>
	<LogFile>ForwardedEvents</LogFile>
	<PublisherName>Microsoft-Windows-EventCollector</PublisherName>
	<AllowedSourceDomainComputers>O:NSG:BAD:P(A;;GA;;;DC)S:</AllowedSourceDomainComputers>
</Subscription>
"#;
