use zip::CompressionMethod;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Annotation descriptor marking members and classes that only exist on the client
    pub client_exclusive_annotation: String,

    /// Annotation descriptor marking members and classes that only exist on the server
    pub server_exclusive_annotation: String,

    /// Annotations whose `value` of `CLIENT` marks a member of a merged jar as client-only
    ///
    /// Such members are ignored when following references out of a class, since they are
    /// stripped from the dedicated server at runtime.
    pub side_only_annotations: Vec<String>,

    /// Classes in a merged jar that the name oracle does not know (added by a mod loader) are
    /// assumed client-only when their entry name contains this
    pub client_name_hint: String,

    /// Manifest main attribute set to `true` in every produced jar
    pub marker_attribute: String,

    /// Compression used for produced jars
    pub compression: CompressionMethod,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            client_exclusive_annotation: String::from(
                "Lnet/msrandom/minecraftcodev/annotations/UnsafeForCommon;",
            ),
            server_exclusive_annotation: String::from(
                "Lnet/msrandom/minecraftcodev/annotations/UnsafeForClient;",
            ),
            side_only_annotations: vec![
                String::from("Lnet/minecraftforge/api/distmarker/OnlyIn;"),
                String::from("Lcpw/mods/fml/relauncher/SideOnly;"),
                String::from("Lnet/minecraftforge/fml/relauncher/SideOnly;"),
            ],
            client_name_hint: String::from("client"),
            marker_attribute: String::from(crate::archive::MINECRAFT_MARKER_ATTRIBUTE),
            compression: CompressionMethod::Deflated,
        }
    }
}
