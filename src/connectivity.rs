use crate::{
    datatypes::{BendingElement, LeafletLayout, Spring},
    profiles::SeverityProfile,
};

/// Cross springs are half as stiff as longitudinal ones
pub const CROSS_STIFFNESS_RATIO: f64 = 0.5;

/// Springs and bending elements derived from a leaflet layout
#[derive(Debug, Clone, PartialEq)]
pub struct Connectivity {
    /// Longitudinal springs for every leaflet, then cross springs for every leaflet
    pub springs: Vec<Spring>,
    pub longitudinal_count: usize,
    pub beams: Vec<BendingElement>,
}

/// Distance between the endpoints of a cross spring
pub fn cross_skip(points_per_leaflet: usize) -> usize {
    usize::max(1, points_per_leaflet / 8)
}

/// Number of cross springs in a single leaflet
pub fn cross_springs_per_leaflet(points_per_leaflet: usize) -> usize {
    let skip = cross_skip(points_per_leaflet);
    points_per_leaflet.saturating_sub(skip + 1).div_ceil(skip)
}

/// Builds springs and beams over the contiguous leaflet blocks
///
/// # Arguments
/// * `layout` - The leaflet index layout produced by the assembler
/// * `profile` - The severity profile supplying stiffness and rigidity
pub fn build(layout: &LeafletLayout, profile: &SeverityProfile) -> Connectivity {
    let n = layout.points_per_leaflet();
    let skip = cross_skip(n);

    let mut springs: Vec<Spring> = Vec::with_capacity(
        layout.leaflet_count() * (n - 1 + cross_springs_per_leaflet(n)),
    );
    let mut beams: Vec<BendingElement> =
        Vec::with_capacity(layout.leaflet_count() * n.saturating_sub(2));

    // Longitudinal springs along each leaflet
    for block in layout.blocks() {
        for i in block.start..block.end - 1 {
            springs.push(Spring {
                nodes: [i, i + 1],
                stiffness: profile.spring_stiffness,
                damping: 0.0,
            });
        }
    }
    let longitudinal_count = springs.len();

    // Bending elements over interior triples
    for block in layout.blocks() {
        for i in block.start..block.end - 2 {
            beams.push(BendingElement {
                nodes: [i, i + 1, i + 2],
                rigidity: profile.beam_rigidity,
            });
        }
    }

    // Cross springs; the last index is excluded so the terminal
    // longitudinal connection is never duplicated
    for block in layout.blocks() {
        for i in (0..n.saturating_sub(skip + 1)).step_by(skip) {
            springs.push(Spring {
                nodes: [block.start + i, block.start + i + skip],
                stiffness: profile.spring_stiffness * CROSS_STIFFNESS_RATIO,
                damping: 0.0,
            });
        }
    }

    Connectivity {
        springs,
        longitudinal_count,
        beams,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::{Severity, SeverityTable};

    fn healthy() -> SeverityProfile {
        *SeverityTable::standard().get(Severity::Healthy)
    }

    #[test]
    fn four_points_per_leaflet() {
        let layout = LeafletLayout::new(4).unwrap();
        let c = build(&layout, &healthy());

        assert_eq!(c.longitudinal_count, 9);
        assert_eq!(c.springs.len(), 15);
        assert_eq!(c.beams.len(), 6);

        let cross: Vec<[usize; 2]> = c.springs[9..].iter().map(|s| s.nodes).collect();
        assert_eq!(
            cross,
            vec![[0, 1], [1, 2], [4, 5], [5, 6], [8, 9], [9, 10]]
        );
        for s in &c.springs[9..] {
            assert_eq!(s.stiffness, 250.0);
            assert_eq!(s.damping, 0.0);
        }
        for s in &c.springs[..9] {
            assert_eq!(s.stiffness, 500.0);
        }
        assert_eq!(c.beams[0].nodes, [0, 1, 2]);
        assert_eq!(c.beams[5].nodes, [9, 10, 11]);
        assert!(c.beams.iter().all(|b| b.rigidity == 1.0e-2));
    }

    #[test]
    fn two_points_have_no_beams_or_cross_springs() {
        let layout = LeafletLayout::new(2).unwrap();
        let c = build(&layout, &healthy());
        assert_eq!(c.springs.len(), 3);
        assert_eq!(c.longitudinal_count, 3);
        assert!(c.beams.is_empty());
    }

    #[test]
    fn skip_grows_with_resolution() {
        assert_eq!(cross_skip(4), 1);
        assert_eq!(cross_skip(15), 1);
        assert_eq!(cross_skip(16), 2);
        assert_eq!(cross_skip(64), 8);

        // skip 8: i in {0, 8, ..., 48} while i + 8 < 63
        assert_eq!(cross_springs_per_leaflet(64), 7);
        let layout = LeafletLayout::new(64).unwrap();
        let c = build(&layout, &healthy());
        assert_eq!(c.springs.len() - c.longitudinal_count, 21);
        let first_cross = c.springs[c.longitudinal_count];
        assert_eq!(first_cross.nodes, [0, 8]);
        assert_eq!(c.springs.last().unwrap().nodes, [128 + 48, 128 + 56]);
    }

    #[test]
    fn counts_match_closed_form() {
        for n in 2..=128 {
            let layout = LeafletLayout::new(n).unwrap();
            let c = build(&layout, &healthy());
            assert_eq!(c.longitudinal_count, 3 * (n - 1));
            assert_eq!(
                c.springs.len(),
                3 * (n - 1 + cross_springs_per_leaflet(n))
            );
            assert_eq!(c.beams.len(), 3 * n.saturating_sub(2));
        }
    }

    #[test]
    fn no_element_leaves_its_leaflet() {
        for n in 2..=128 {
            let layout = LeafletLayout::new(n).unwrap();
            let c = build(&layout, &healthy());

            for s in &c.springs {
                let [a, b] = s.nodes;
                assert_ne!(a, b);
                let leaflet = layout.leaflet_of(a).expect("index in range");
                assert_eq!(layout.leaflet_of(b), Some(leaflet));
            }
            for beam in &c.beams {
                let leaflet = layout.leaflet_of(beam.nodes[0]).expect("index in range");
                assert!(beam
                    .nodes
                    .iter()
                    .all(|&i| layout.leaflet_of(i) == Some(leaflet)));
                assert_eq!(beam.nodes[1], beam.nodes[0] + 1);
                assert_eq!(beam.nodes[2], beam.nodes[0] + 2);
            }
        }
    }
}
