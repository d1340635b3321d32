//! Commands, events, and types used throughout gridwall.
//!
//! This module defines the vocabulary that all components share:
//! [`Command`] describes every request a control client can make,
//! [`SurfaceEvent`] describes the content-lifecycle signals a renderer
//! reports back, and [`CellRef`] / [`PixelRect`] / [`LayoutSpec`] provide
//! the supporting data types.
//!
//! Control clients send loosely-typed JSON; the daemon parses cell
//! references (`"col row"` strings or `{"col", "row"}` objects) and layout
//! maps keyed by cell-reference strings.

use serde::de::Error as DeError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// A cell position `(col, row)` in the wall grid.
///
/// Cells are 0-indexed from the top-left corner. The grid dimension is a
/// fixed configuration value; `CellRef` itself carries no bounds — the
/// orchestrator validates references against its grid on entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    /// Column (0-indexed).
    pub col: u32,
    /// Row (0-indexed).
    pub row: u32,
}

impl CellRef {
    /// Shorthand constructor.
    pub fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.col, self.row)
    }
}

/// Cells serialize as `"col row"` strings so they can double as JSON map
/// keys in [`LayoutSpec`].
impl Serialize for CellRef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Parse a `"col row"` cell reference string.
fn parse_cell_str(s: &str) -> Option<CellRef> {
    let mut parts = s.split_whitespace();
    let col: u32 = parts.next()?.parse().ok()?;
    let row: u32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(CellRef { col, row })
}

impl<'de> Deserialize<'de> for CellRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Visitor;
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = CellRef;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "string \"col row\" or object {{col, row}}")
            }
            fn visit_str<E>(self, s: &str) -> Result<CellRef, E>
            where
                E: DeError,
            {
                parse_cell_str(s)
                    .ok_or_else(|| DeError::custom(format!("invalid cell reference: {:?}", s)))
            }
            fn visit_map<A>(self, mut map: A) -> Result<CellRef, A::Error>
            where
                A: serde::de::MapAccess<'de>,
            {
                let mut col = None;
                let mut row = None;
                while let Some(k) = map.next_key::<String>()? {
                    match k.as_str() {
                        "col" => col = Some(map.next_value()?),
                        "row" => row = Some(map.next_value()?),
                        _ => {
                            let _: serde::de::IgnoredAny = map.next_value()?;
                        }
                    }
                }
                Ok(CellRef {
                    col: col.ok_or_else(|| DeError::missing_field("col"))?,
                    row: row.ok_or_else(|| DeError::missing_field("row"))?,
                })
            }
        }
        deserializer.deserialize_any(V)
    }
}

/// An axis-aligned pixel rectangle on the wall surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    /// Left edge (pixels).
    pub x: i32,
    /// Top edge (pixels).
    pub y: i32,
    /// Width (pixels).
    pub width: u32,
    /// Height (pixels).
    pub height: u32,
}

impl fmt::Display for PixelRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// A sparse desired layout: cell → content URL.
///
/// Supplied wholesale on every update; cells absent from the map are empty.
/// On the wire this is a JSON object keyed by `"col row"` strings:
///
/// ```json
/// {"0 0": "https://example.org/a", "1 0": "https://example.org/b"}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutSpec(BTreeMap<CellRef, String>);

impl LayoutSpec {
    /// Build a layout from `(cell, url)` pairs. Later duplicates win.
    pub fn new(pairs: impl IntoIterator<Item = (CellRef, String)>) -> Self {
        Self(pairs.into_iter().collect())
    }

    /// The URL assigned to `cell`, if any.
    pub fn url_at(&self, cell: CellRef) -> Option<&str> {
        self.0.get(&cell).map(String::as_str)
    }

    /// Iterate over all assigned cells.
    pub fn cells(&self) -> impl Iterator<Item = CellRef> + '_ {
        self.0.keys().copied()
    }

    /// Number of assigned cells.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no cell is assigned.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for LayoutSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (cell, url) in &self.0 {
            map.serialize_entry(cell, url)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LayoutSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = BTreeMap::<CellRef, String>::deserialize(deserializer)?;
        Ok(Self(map))
    }
}

/// Every request a control client can make.
///
/// Commands are produced by [`InputSource`](crate::traits::InputSource)
/// implementations and consumed by the [`Wall`](crate::wall::Wall).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Replace the desired layout wholesale. Idempotent.
    SetLayout(LayoutSpec),

    /// Move the listening focus to the given cell. Idempotent.
    ///
    /// The slot whose region spans this cell is unmuted; every other slot
    /// is muted. An out-of-grid cell is rejected and the previous focus
    /// retained.
    SetFocus(CellRef),

    /// Clear every cell — shorthand for `SetLayout` with an empty map.
    ///
    /// On the wire this is encoded as the JSON string `"ClearWall"`.
    ClearWall,
}

/// A content-lifecycle signal reported by the rendering surface.
///
/// Each variant carries the URL the corresponding `display` call was issued
/// for, so the slot machine can discard signals that arrive after the slot
/// has moved on to a different URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SurfaceEvent {
    /// The slot's content is confirmed ready and visible.
    Ready {
        slot: usize,
        url: String,
        /// Content title reported by the renderer, kept as slot metadata.
        title: String,
    },
    /// The slot could not produce ready content for the requested URL.
    Failed { slot: usize, url: String },
}

/// Everything the control loop consumes: external commands and renderer
/// events, interleaved on one channel so pool reads stay consistent.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Command(Command),
    Surface(SurfaceEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_display_round_trips_through_parse() {
        let cell = CellRef::new(3, 7);
        assert_eq!(parse_cell_str(&cell.to_string()), Some(cell));
    }

    #[test]
    fn cell_from_string_form() {
        let cell: CellRef = serde_json::from_str(r#""2 5""#).unwrap();
        assert_eq!(cell, CellRef::new(2, 5));
    }

    #[test]
    fn cell_from_object_form() {
        let cell: CellRef = serde_json::from_str(r#"{"col": 4, "row": 1}"#).unwrap();
        assert_eq!(cell, CellRef::new(4, 1));
    }

    #[test]
    fn cell_rejects_garbage() {
        assert!(serde_json::from_str::<CellRef>(r#""one two""#).is_err());
        assert!(serde_json::from_str::<CellRef>(r#""1""#).is_err());
        assert!(serde_json::from_str::<CellRef>(r#""1 2 3""#).is_err());
        assert!(serde_json::from_str::<CellRef>(r#"{"col": 1}"#).is_err());
    }

    #[test]
    fn layout_spec_from_json_map() {
        let spec: LayoutSpec =
            serde_json::from_str(r#"{"0 0": "https://a", "1 0": "https://b"}"#).unwrap();
        assert_eq!(spec.len(), 2);
        assert_eq!(spec.url_at(CellRef::new(0, 0)), Some("https://a"));
        assert_eq!(spec.url_at(CellRef::new(1, 0)), Some("https://b"));
        assert_eq!(spec.url_at(CellRef::new(1, 1)), None);
    }

    #[test]
    fn layout_spec_serializes_with_string_keys() {
        let spec = LayoutSpec::new([(CellRef::new(0, 1), "https://a".to_string())]);
        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(json, r#"{"0 1":"https://a"}"#);
    }

    #[test]
    fn set_layout_command_wire_format() {
        let cmd: Command =
            serde_json::from_str(r#"{"SetLayout": {"0 0": "https://a"}}"#).unwrap();
        match cmd {
            Command::SetLayout(spec) => {
                assert_eq!(spec.url_at(CellRef::new(0, 0)), Some("https://a"))
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn set_focus_command_accepts_both_forms() {
        let a: Command = serde_json::from_str(r#"{"SetFocus": "0 1"}"#).unwrap();
        let b: Command = serde_json::from_str(r#"{"SetFocus": {"col": 0, "row": 1}}"#).unwrap();
        assert_eq!(a, Command::SetFocus(CellRef::new(0, 1)));
        assert_eq!(a, b);
    }

    #[test]
    fn clear_wall_command_wire_format() {
        let cmd: Command = serde_json::from_str(r#""ClearWall""#).unwrap();
        assert_eq!(cmd, Command::ClearWall);
    }

    #[test]
    fn surface_event_wire_format() {
        let ready: SurfaceEvent = serde_json::from_str(
            r#"{"Ready": {"slot": 0, "url": "https://a", "title": "A"}}"#,
        )
        .unwrap();
        assert_eq!(
            ready,
            SurfaceEvent::Ready {
                slot: 0,
                url: "https://a".into(),
                title: "A".into()
            }
        );
        let failed: SurfaceEvent =
            serde_json::from_str(r#"{"Failed": {"slot": 2, "url": "https://b"}}"#).unwrap();
        assert_eq!(
            failed,
            SurfaceEvent::Failed {
                slot: 2,
                url: "https://b".into()
            }
        );
    }

    #[test]
    fn pixel_rect_display() {
        let rect = PixelRect {
            x: 10,
            y: 20,
            width: 192,
            height: 108,
        };
        assert_eq!(rect.to_string(), "192x108+10+20");
    }
}
