// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flattening of device and plugin configuration into [`PropertyMap`]s.

use simbridge_core::{PropertyMap, SimbridgeError};

use crate::document::{ConfigDocument, ConfigNode};

/// Attribute identifying the device a `<device>` node configures.
pub const DEVICE_REFERENCE_ATTRIBUTE: &str = "reference";

/// Section of a device node holding its property overrides.
pub const DEVICE_ROS_TAG: &str = "ros";

/// Tag of a dynamic plugin declaration.
pub const PLUGIN_TAG: &str = "plugin";

/// Attribute naming the plugin type to load.
pub const PLUGIN_TYPE_ATTRIBUTE: &str = "type";

/// A `<plugin>` declaration, ready for loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDeclaration {
    /// Plugin type from the `type` attribute, used as the loader key.
    pub type_name: String,
    /// Source line of the `<plugin>` element.
    pub line: u32,
    /// One entry per direct child element.
    pub properties: PropertyMap,
}

/// Resolves device and plugin properties against a [`ConfigDocument`].
#[derive(Debug, Clone, Copy)]
pub struct DeviceConfigResolver<'a> {
    document: &'a ConfigDocument,
}

impl<'a> DeviceConfigResolver<'a> {
    pub fn new(document: &'a ConfigDocument) -> Self {
        Self { document }
    }

    /// Properties of the device called `name`: `{enabled: "true"}` merged
    /// with the children of its `<ros>` section, overrides winning.
    pub fn resolve_device_properties(&self, name: &str) -> PropertyMap {
        let mut properties = PropertyMap::device_defaults();

        let Some(webots) = self.document.webots_section() else {
            return properties;
        };

        let ros = webots
            .find_child_by_attribute(DEVICE_REFERENCE_ATTRIBUTE, name)
            .and_then(|device| device.find_child(DEVICE_ROS_TAG));

        if let Some(ros) = ros {
            for property in ros.children() {
                properties.insert(property.tag(), property.text().unwrap_or_default());
            }
        }

        properties
    }

    /// Properties of a plugin declaration: one entry per direct child.
    pub fn resolve_plugin_properties(node: &ConfigNode) -> PropertyMap {
        node.children()
            .iter()
            .map(|child| (child.tag(), child.text().unwrap_or_default()))
            .collect()
    }

    /// Every `<plugin>` of the `<webots>` section, in document order.
    ///
    /// A declaration without a `type` attribute is a fatal error carrying
    /// its source line.
    pub fn plugin_declarations(&self) -> Result<Vec<PluginDeclaration>, SimbridgeError> {
        self.declarations().collect()
    }

    /// Lazy form of [`plugin_declarations`](Self::plugin_declarations).
    ///
    /// Each `<plugin>` is checked only when it is reached, so a caller that
    /// loads as it iterates has already loaded every declaration before an
    /// untyped one.
    pub fn declarations(
        self,
    ) -> impl Iterator<Item = Result<PluginDeclaration, SimbridgeError>> + 'a {
        self.document
            .webots_section()
            .into_iter()
            .flat_map(|webots| webots.children_named(PLUGIN_TAG))
            .map(Self::declaration)
    }

    fn declaration(node: &ConfigNode) -> Result<PluginDeclaration, SimbridgeError> {
        let type_name = node
            .attribute(PLUGIN_TYPE_ATTRIBUTE)
            .ok_or(SimbridgeError::MissingPluginType { line: node.line() })?;
        Ok(PluginDeclaration {
            type_name: type_name.to_string(),
            line: node.line(),
            properties: Self::resolve_plugin_properties(node),
        })
    }

    /// Names of all devices that carry an explicit configuration node.
    pub fn configured_devices(&self) -> Vec<&'a str> {
        self.document
            .webots_section()
            .map(|webots| {
                webots
                    .children()
                    .iter()
                    .filter_map(|c| c.attribute(DEVICE_REFERENCE_ATTRIBUTE))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(xml: &str) -> ConfigDocument {
        ConfigDocument::parse(xml).unwrap()
    }

    #[test]
    fn absent_document_gives_defaults() {
        let document = ConfigDocument::empty();
        let resolver = DeviceConfigResolver::new(&document);
        assert_eq!(
            resolver.resolve_device_properties("camera0"),
            PropertyMap::device_defaults()
        );
        assert!(resolver.plugin_declarations().unwrap().is_empty());
    }

    #[test]
    fn device_without_ros_section_gives_defaults() {
        let document = doc(r#"<robot><webots><device reference="lidar"/></webots></robot>"#);
        let resolver = DeviceConfigResolver::new(&document);
        assert_eq!(
            resolver.resolve_device_properties("lidar"),
            PropertyMap::device_defaults()
        );
    }

    #[test]
    fn overrides_replace_defaults() {
        let document = doc(
            r#"<robot><webots>
                <device reference="lidar">
                    <ros>
                        <enabled>false</enabled>
                        <topicName>/scan</topicName>
                        <frameName></frameName>
                    </ros>
                </device>
            </webots></robot>"#,
        );
        let props = DeviceConfigResolver::new(&document).resolve_device_properties("lidar");
        assert_eq!(props.get("enabled"), Some("false"));
        assert_eq!(props.get("topicName"), Some("/scan"));
        assert_eq!(props.get("frameName"), Some(""));
        assert_eq!(props.len(), 3);
    }

    #[test]
    fn other_devices_are_not_affected() {
        let document = doc(
            r#"<robot><webots>
                <device reference="lidar"><ros><updateRate>5</updateRate></ros></device>
            </webots></robot>"#,
        );
        let props = DeviceConfigResolver::new(&document).resolve_device_properties("camera");
        assert_eq!(props, PropertyMap::device_defaults());
    }

    #[test]
    fn plugin_properties_have_no_defaults() {
        let document = doc(
            r#"<robot><webots>
                <plugin type="rover::Drive">
                    <wheelRadius>0.05</wheelRadius>
                    <leftMotor>left wheel</leftMotor>
                </plugin>
            </webots></robot>"#,
        );
        let declarations = DeviceConfigResolver::new(&document)
            .plugin_declarations()
            .unwrap();
        assert_eq!(declarations.len(), 1);
        let props = &declarations[0].properties;
        assert_eq!(props.len(), 2);
        assert_eq!(props.get("wheelRadius"), Some("0.05"));
        assert_eq!(props.get("leftMotor"), Some("left wheel"));
        assert!(!props.contains_key("enabled"));
    }

    #[test]
    fn plugin_without_type_reports_line() {
        let document = doc("<robot>\n<webots>\n<plugin type=\"ok\"/>\n<plugin/>\n</webots>\n</robot>");
        let err = DeviceConfigResolver::new(&document)
            .plugin_declarations()
            .unwrap_err();
        assert!(matches!(err, SimbridgeError::MissingPluginType { line: 4 }));
    }

    #[test]
    fn device_property_text_keeps_surrounding_whitespace() {
        let document = doc(
            r#"<robot><webots>
                <device reference="lidar">
                    <ros><enabled> false </enabled><topicName> /a b </topicName></ros>
                </device>
            </webots></robot>"#,
        );
        let props = DeviceConfigResolver::new(&document).resolve_device_properties("lidar");
        assert_eq!(props.get("enabled"), Some(" false "));
        assert_eq!(props.get("topicName"), Some(" /a b "));
        assert!(!props.is_disabled());
    }

    #[test]
    fn declarations_yield_typed_plugins_before_the_untyped_one() {
        let document = doc("<robot>\n<webots>\n<plugin type=\"ok\"/>\n<plugin/>\n</webots>\n</robot>");
        let mut declarations = DeviceConfigResolver::new(&document).declarations();
        assert_eq!(declarations.next().unwrap().unwrap().type_name, "ok");
        assert!(matches!(
            declarations.next(),
            Some(Err(SimbridgeError::MissingPluginType { line: 4 }))
        ));
        assert!(declarations.next().is_none());
    }

    #[test]
    fn configured_devices_lists_references() {
        let document = doc(
            r#"<robot><webots>
                <device reference="a"/><plugin type="p"/><device reference="b"/>
            </webots></robot>"#,
        );
        assert_eq!(
            DeviceConfigResolver::new(&document).configured_devices(),
            vec!["a", "b"]
        );
    }
}
