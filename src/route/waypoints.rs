//! Portfolio waypoints and the proximity trigger that fires them.
//!
//! A waypoint arms inside a narrow window around its trigger progress and
//! disarms only once the car is well clear of it. The gap between the two
//! windows keeps a waypoint from firing again while the car creeps to a halt
//! on top of it.

use bevy::prelude::*;

/// Label used when a waypoint is authored without a name.
pub const UNNAMED_WAYPOINT: &str = "UNNAMED_SECTOR";

/// What a waypoint's content panel is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WaypointKind {
    Hero,
    Skills,
    Experience,
    Project,
    Services,
    Contact,
}

/// Where a waypoint's call-to-action button leads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkTarget {
    /// Absolute URL or site-relative path.
    Url(String),
    /// Opens the in-app contact modal.
    ContactForm,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaypointLink {
    pub label: String,
    pub target: LinkTarget,
}

/// Static authoring data for one waypoint. Text may be missing.
#[derive(Clone, Copy, Debug)]
pub struct WaypointEntry {
    pub trigger: f32,
    pub name: Option<&'static str>,
    pub description: Option<&'static str>,
    pub kind: WaypointKind,
    /// `(label, url)`; a contact waypoint gets the contact form regardless.
    pub link: Option<(&'static str, &'static str)>,
}

/// The sections of the drive, in route order.
pub const PORTFOLIO_SECTIONS: &[WaypointEntry] = &[
    WaypointEntry {
        trigger: 0.05,
        name: Some("HI — I'M SUNIL"),
        description: Some(
            "Driving the future of the web with immersive and high-speed experiences. \
             Scroll is boring — so I built a journey instead.",
        ),
        kind: WaypointKind::Hero,
        link: None,
    },
    WaypointEntry {
        trigger: 0.20,
        name: Some("SKILLS"),
        description: Some(
            "HTML, CSS, JavaScript, React, Three.js, and Python — building responsive \
             and interactive Web applications.",
        ),
        kind: WaypointKind::Skills,
        link: None,
    },
    WaypointEntry {
        trigger: 0.35,
        name: Some("ABOUT ME"),
        description: Some("I design and develop user-friendly websites with modern technologies."),
        kind: WaypointKind::Experience,
        link: None,
    },
    WaypointEntry {
        trigger: 0.55,
        name: Some("PROJECTS"),
        description: Some("Click LIVE VIEW to explore my projects and see my work in action."),
        kind: WaypointKind::Project,
        link: Some(("LIVE VIEW", "/projects.html")),
    },
    WaypointEntry {
        trigger: 0.75,
        name: Some("SERVICES"),
        description: Some(
            "From lightning-fast landing pages to immersive full-stack platforms — \
             I build web products that stand out.",
        ),
        kind: WaypointKind::Services,
        link: None,
    },
    WaypointEntry {
        trigger: 0.92,
        name: Some("CONTACT ME"),
        description: Some("Have a project in mind? Let's work together."),
        kind: WaypointKind::Contact,
        link: Some(("CONTACT ME", "")),
    },
];

/// A content-bearing trigger point along the route.
#[derive(Clone, Debug, PartialEq)]
pub struct Waypoint {
    pub trigger_progress: f32,
    pub display_name: String,
    pub description: String,
    pub kind: WaypointKind,
    pub link: Option<WaypointLink>,
    fired: bool,
}

impl Waypoint {
    /// Resolves authoring data, substituting defaults for missing text.
    pub fn from_entry(entry: &WaypointEntry) -> Self {
        let display_name = match entry.name {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => {
                warn!(
                    "Waypoint at {:.3} has no name, using {}",
                    entry.trigger, UNNAMED_WAYPOINT
                );
                UNNAMED_WAYPOINT.to_string()
            }
        };

        let description = entry.description.map(str::to_string).unwrap_or_else(|| {
            warn!("Waypoint '{}' has no description", display_name);
            String::new()
        });

        let trigger_progress = if entry.trigger > 0.0 && entry.trigger < 1.0 {
            entry.trigger
        } else {
            let clamped = entry.trigger.clamp(0.001, 0.999);
            warn!(
                "Waypoint '{}' trigger {} outside (0, 1), clamped to {}",
                display_name, entry.trigger, clamped
            );
            clamped
        };

        let link = match (entry.kind, entry.link) {
            (WaypointKind::Contact, link) => Some(WaypointLink {
                label: link.map_or("CONTACT ME", |(label, _)| label).to_string(),
                target: LinkTarget::ContactForm,
            }),
            (_, Some((label, url))) => Some(WaypointLink {
                label: label.to_string(),
                target: LinkTarget::Url(url.to_string()),
            }),
            (_, None) => None,
        };

        Self {
            trigger_progress,
            display_name,
            description,
            kind: entry.kind,
            link,
            fired: false,
        }
    }

    pub fn fired(&self) -> bool {
        self.fired
    }

    /// HUD section label: lower-case name with whitespace runs turned into `-`.
    pub fn slug(&self) -> String {
        self.display_name
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
    }
}

/// Arm/disarm thresholds, in progress units.
#[derive(Resource, Clone, Copy, Debug)]
pub struct WaypointConfig {
    /// Distance from the trigger inside which an unfired waypoint fires.
    pub arm_epsilon: f32,
    /// Distance from the trigger beyond which a fired waypoint re-arms.
    pub disarm_epsilon: f32,
}

impl Default for WaypointConfig {
    fn default() -> Self {
        Self {
            arm_epsilon: 0.004,
            disarm_epsilon: 0.04,
        }
    }
}

impl WaypointConfig {
    /// Returns a config that keeps `arm < disarm`.
    pub fn validated(self) -> Self {
        if self.disarm_epsilon > self.arm_epsilon {
            return self;
        }
        let repaired = Self {
            arm_epsilon: self.arm_epsilon,
            disarm_epsilon: self.arm_epsilon * 10.0,
        };
        warn!(
            "Waypoint disarm window {} must exceed arm window {}, widened to {}",
            self.disarm_epsilon, self.arm_epsilon, repaired.disarm_epsilon
        );
        repaired
    }
}

/// Scans waypoints in route order and fires at most one per check.
#[derive(Clone, Debug)]
pub struct WaypointDetector {
    waypoints: Vec<Waypoint>,
    config: WaypointConfig,
}

impl WaypointDetector {
    pub fn new(waypoints: Vec<Waypoint>, config: WaypointConfig) -> Self {
        Self {
            waypoints,
            config: config.validated(),
        }
    }

    pub fn from_entries(entries: &[WaypointEntry], config: WaypointConfig) -> Self {
        Self::new(entries.iter().map(Waypoint::from_entry).collect(), config)
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn config(&self) -> WaypointConfig {
        self.config
    }

    /// Fires the first armed waypoint within reach of `progress`, re-arming
    /// any fired waypoint the car has moved clear of along the way.
    pub fn check(&mut self, progress: f32) -> Option<&Waypoint> {
        let WaypointConfig {
            arm_epsilon,
            disarm_epsilon,
        } = self.config;

        let mut hit = None;
        for (index, waypoint) in self.waypoints.iter_mut().enumerate() {
            let distance = (progress - waypoint.trigger_progress).abs();

            if distance < arm_epsilon && !waypoint.fired {
                waypoint.fired = true;
                hit = Some(index);
                break;
            }

            if distance > disarm_epsilon {
                waypoint.fired = false;
            }
        }

        hit.map(|index| &self.waypoints[index])
    }

    /// Re-arms every waypoint, used when the route wraps to a new lap.
    pub fn reset(&mut self) {
        for waypoint in &mut self.waypoints {
            waypoint.fired = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(trigger: f32) -> WaypointDetector {
        WaypointDetector::from_entries(
            &[WaypointEntry {
                trigger,
                name: Some("TEST"),
                description: Some("desc"),
                kind: WaypointKind::Skills,
                link: None,
            }],
            WaypointConfig::default(),
        )
    }

    #[test]
    fn sweep_fires_once_on_first_entry() {
        let mut detector = single(0.5);
        let mut fired_at = Vec::new();
        for i in 450..=550 {
            let progress = i as f32 / 1000.0;
            if detector.check(progress).is_some() {
                fired_at.push(progress);
            }
        }
        assert_eq!(fired_at.len(), 1);
        assert!(fired_at[0] >= 0.4959 && fired_at[0] <= 0.497);
    }

    #[test]
    fn rearms_only_outside_disarm_window() {
        let mut detector = single(0.5);
        assert!(detector.check(0.5).is_some());

        // Still inside the disarm window: stays fired.
        assert!(detector.check(0.539).is_none());
        assert!(detector.check(0.461).is_none());
        assert!(detector.check(0.5).is_none());

        // Past 0.54 re-arms.
        assert!(detector.check(0.541).is_none());
        assert!(!detector.waypoints()[0].fired());
        assert!(detector.check(0.501).is_some());

        // Below 0.46 re-arms too.
        assert!(detector.check(0.459).is_none());
        assert!(detector.check(0.499).is_some());
    }

    #[test]
    fn ties_break_by_list_order() {
        let entries = [
            WaypointEntry {
                trigger: 0.300,
                name: Some("FIRST"),
                description: None,
                kind: WaypointKind::Hero,
                link: None,
            },
            WaypointEntry {
                trigger: 0.302,
                name: Some("SECOND"),
                description: None,
                kind: WaypointKind::Skills,
                link: None,
            },
        ];
        let mut detector = WaypointDetector::from_entries(&entries, WaypointConfig::default());
        let first = detector.check(0.301).map(|w| w.display_name.clone());
        assert_eq!(first.as_deref(), Some("FIRST"));
        let second = detector.check(0.301).map(|w| w.display_name.clone());
        assert_eq!(second.as_deref(), Some("SECOND"));
        assert!(detector.check(0.301).is_none());
    }

    #[test]
    fn reset_rearms_everything() {
        let mut detector = single(0.5);
        assert!(detector.check(0.5).is_some());
        detector.reset();
        assert!(detector.check(0.5).is_some());
    }

    #[test]
    fn missing_text_gets_defaults() {
        let waypoint = Waypoint::from_entry(&WaypointEntry {
            trigger: 1.5,
            name: None,
            description: None,
            kind: WaypointKind::Services,
            link: None,
        });
        assert_eq!(waypoint.display_name, UNNAMED_WAYPOINT);
        assert!(waypoint.description.is_empty());
        assert!(waypoint.trigger_progress < 1.0);
    }

    #[test]
    fn inverted_windows_are_repaired() {
        let config = WaypointConfig {
            arm_epsilon: 0.05,
            disarm_epsilon: 0.01,
        }
        .validated();
        assert!(config.disarm_epsilon > config.arm_epsilon);
    }

    #[test]
    fn authored_sections_resolve_links() {
        let detector = WaypointDetector::from_entries(PORTFOLIO_SECTIONS, WaypointConfig::default());
        let waypoints = detector.waypoints();
        assert_eq!(waypoints.len(), 6);
        assert_eq!(waypoints[0].display_name, "HI — I'M SUNIL");
        assert_eq!(waypoints[0].slug(), "hi-—-i'm-sunil");

        let project = &waypoints[3];
        assert_eq!(
            project.link.as_ref().map(|l| &l.target),
            Some(&LinkTarget::Url("/projects.html".into()))
        );
        let contact = &waypoints[5];
        assert_eq!(
            contact.link.as_ref().map(|l| &l.target),
            Some(&LinkTarget::ContactForm)
        );
        assert!(waypoints[1].link.is_none());
    }
}
