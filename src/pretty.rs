//! Human-readable rendering of a net, independent of the state-trace file
//! format: group arcs by source and print token counts alongside names.

use crate::petri_net::{Net, PlaceId};
use std::fmt::{self, Display, Formatter};

/// A helper for displaying a list of items separated by a delimiter.
struct Join<'a, T: Display>(&'a [T], &'a str);

impl<'a, T: Display> Display for Join<'a, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut iter = self.0.iter();
        if let Some(first) = iter.next() {
            write!(f, "{}", first)?;
        }
        for item in iter {
            write!(f, "{}{}", self.1, item)?;
        }
        Ok(())
    }
}

impl Display for Net {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Places:")?;
        let mut place_ids: Vec<PlaceId> = self.place_ids().collect();
        place_ids.sort_by_key(|id| self.place_name(*id).to_string());
        for id in place_ids {
            writeln!(f, "\t{}: {}", self.place_name(id), self.tokens(id))?;
        }

        writeln!(f, "Transitions:")?;
        let mut transition_names: Vec<&str> = self.transition_ids().map(|id| self.transition_name(id)).collect();
        transition_names.sort_unstable();
        for name in transition_names {
            writeln!(f, "\t{}", name)?;
        }

        writeln!(f, "Clusters:")?;
        for cluster in self.clusters() {
            let mut places: Vec<&str> = cluster.places.iter().map(|&p| self.place_name(p)).collect();
            places.sort_unstable();
            let mut transitions: Vec<&str> = cluster.transitions.iter().map(|&t| self.transition_name(t)).collect();
            transitions.sort_unstable();
            writeln!(f, "\t{}: places [{}], transitions [{}]", cluster.id, Join(&places, ", "), Join(&transitions, ", "))?;
        }

        writeln!(f, "Edges:")?;
        for id in self.transition_ids() {
            let name = self.transition_name(id);
            for edge in self.in_arcs(id) {
                writeln!(f, "\t{} --{}--> {}", self.place_name(edge.node), edge.weight, name)?;
            }
            for edge in self.out_arcs(id) {
                writeln!(f, "\t{} --{}--> {}", name, edge.weight, self.place_name(edge.node))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::petri_net::NetBuilder;

    #[test]
    fn renders_places_transitions_and_edges() {
        let mut b = NetBuilder::new();
        b.add_place("p1", 1).unwrap();
        b.add_transition("t1").unwrap();
        b.add_arc("p1", "t1", 2).unwrap();
        let net = b.build();
        let rendered = net.to_string();
        assert!(rendered.contains("p1: 1"));
        assert!(rendered.contains("t1"));
        assert!(rendered.contains("p1 --2--> t1"));
    }
}
