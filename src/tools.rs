use serde::{Deserialize, Serialize};

/// Which OS authorization subsystem a tool needs before it may scan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum PermissionKind {
    Location,
    Camera,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ToolKind {
    Bluetooth,
    Wifi,
    Camera,
    Magnetic,
    Infrared,
}

impl ToolKind {
    /// Integer code persisted in the `type` column of scan records.
    pub fn code(&self) -> i64 {
        match self {
            ToolKind::Bluetooth => 0,
            ToolKind::Wifi => 1,
            ToolKind::Camera => 2,
            ToolKind::Magnetic => 3,
            ToolKind::Infrared => 4,
        }
    }

    pub fn from_code(code: i64) -> Option<ToolKind> {
        match code {
            0 => Some(ToolKind::Bluetooth),
            1 => Some(ToolKind::Wifi),
            2 => Some(ToolKind::Camera),
            3 => Some(ToolKind::Magnetic),
            4 => Some(ToolKind::Infrared),
            _ => None,
        }
    }

    pub fn required_permission(&self) -> PermissionKind {
        match self {
            // Bluetooth/Wi-Fi/magnetic sweeps reveal location context, so the
            // OS gates them behind the location authority.
            ToolKind::Bluetooth | ToolKind::Wifi | ToolKind::Magnetic => PermissionKind::Location,
            ToolKind::Camera | ToolKind::Infrared => PermissionKind::Camera,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::Bluetooth => "bluetooth",
            ToolKind::Wifi => "wifi",
            ToolKind::Camera => "camera",
            ToolKind::Magnetic => "magnetic",
            ToolKind::Infrared => "infrared",
        }
    }
}

/// One tile in the tool catalog. Static display metadata only — the catalog
/// has no lifecycle and is never mutated at runtime.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolItem {
    pub kind: ToolKind,
    pub name: &'static str,
    pub icon: &'static str,
    pub accent: &'static str,
    pub description: &'static str,
}

pub const CATALOG: [ToolItem; 5] = [
    ToolItem {
        kind: ToolKind::Bluetooth,
        name: "Bluetooth Scanner",
        icon: "tool_bluetooth",
        accent: "#2F80ED",
        description: "Finds nearby Bluetooth transmitters, including trackers that follow you.",
    },
    ToolItem {
        kind: ToolKind::Wifi,
        name: "Wi-Fi Scanner",
        icon: "tool_wifi",
        accent: "#27AE60",
        description: "Lists devices on the local network and flags camera-like services.",
    },
    ToolItem {
        kind: ToolKind::Camera,
        name: "Lens Detector",
        icon: "tool_camera",
        accent: "#EB5757",
        description: "Uses the camera to spot reflective pinhole lenses.",
    },
    ToolItem {
        kind: ToolKind::Magnetic,
        name: "Magnetic Sensor",
        icon: "tool_magnetic",
        accent: "#9B51E0",
        description: "Reads the magnetometer to locate powered electronics inside objects.",
    },
    ToolItem {
        kind: ToolKind::Infrared,
        name: "Infrared Check",
        icon: "tool_infrared",
        accent: "#F2994A",
        description: "Highlights infrared illuminators invisible to the naked eye.",
    },
];

pub fn catalog() -> &'static [ToolItem] {
    &CATALOG
}

pub fn item(kind: ToolKind) -> &'static ToolItem {
    CATALOG
        .iter()
        .find(|tool| tool.kind == kind)
        .expect("catalog covers every ToolKind")
}
