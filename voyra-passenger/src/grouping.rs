use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::model::{DepartureScope, Passenger};
use crate::palette::GroupPalette;

/// Assign a group color to every passenger in manifest order.
///
/// Mains are colored in a single left-to-right pass: a color already
/// committed to the scope (present in `reserved`) is kept as-is, a main
/// linked from its predecessor reuses the carried color, and anything else
/// takes the first palette token not yet in use. Dependents then inherit
/// their main's color. Total over well-formed input; a dependent pointing at
/// a missing main ends up with no color rather than an error.
///
/// Colors only mean anything inside one (tour, departure date) scope, so a
/// `None` scope nulls every color instead.
pub fn assign_group_colors(
    passengers: &mut [Passenger],
    reserved: &HashSet<String>,
    palette: &GroupPalette,
    scope: Option<&DepartureScope>,
) {
    if scope.is_none() {
        for passenger in passengers.iter_mut() {
            passenger.group_color = None;
        }
        return;
    }

    // Tokens this scope can still hand out. Reserved tokens belong to other
    // chains and must never be re-picked, even once the palette wraps.
    let pool: Vec<String> = palette
        .iter()
        .filter(|color| !reserved.contains(*color))
        .map(|color| color.to_string())
        .collect();

    let mut taken: HashSet<String> = reserved.clone();
    let mut carry_over: Option<String> = None;
    let mut overflow_picks = 0usize;

    for passenger in passengers.iter_mut().filter(|p| p.is_main()) {
        let chosen = match &passenger.group_color {
            // Previously committed for this scope: keep unchanged.
            Some(existing) if reserved.contains(existing) => Some(existing.clone()),
            _ => match carry_over.take() {
                Some(color) => Some(color),
                None => pick_fresh(&pool, &taken, &mut overflow_picks),
            },
        };

        if let Some(color) = &chosen {
            taken.insert(color.clone());
        }
        carry_over = if passenger.is_related_to_next {
            chosen.clone()
        } else {
            None
        };
        passenger.group_color = chosen;
    }

    let main_colors: HashMap<Uuid, Option<String>> = passengers
        .iter()
        .filter(|p| p.is_main())
        .map(|p| (p.id, p.group_color.clone()))
        .collect();

    for passenger in passengers.iter_mut().filter(|p| !p.is_main()) {
        passenger.group_color = passenger
            .main_passenger_id
            .and_then(|main_id| main_colors.get(&main_id).cloned().flatten());
    }
}

/// First pool token not yet taken; once every token is in use, reuse the
/// pool cyclically in hand-out order.
fn pick_fresh(pool: &[String], taken: &HashSet<String>, overflow_picks: &mut usize) -> Option<String> {
    if pool.is_empty() {
        return None;
    }
    for color in pool {
        if !taken.contains(color) {
            return Some(color.clone());
        }
    }
    let color = pool[*overflow_picks % pool.len()].clone();
    *overflow_picks += 1;
    Some(color)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> DepartureScope {
        DepartureScope {
            tour_id: Uuid::new_v4(),
            departure_date: chrono::NaiveDate::from_ymd_opt(2026, 9, 12).unwrap(),
        }
    }

    fn palette() -> GroupPalette {
        GroupPalette::new(vec!["red".into(), "blue".into(), "green".into()])
    }

    fn main(order_id: Uuid, seq: i32, linked: bool) -> Passenger {
        let p = Passenger::new(order_id, seq, format!("Main{}", seq), "Traveler".into());
        if linked {
            p.linked_to_next()
        } else {
            p
        }
    }

    fn colors(passengers: &[Passenger]) -> Vec<Option<String>> {
        passengers.iter().map(|p| p.group_color.clone()).collect()
    }

    #[test]
    fn test_fresh_mains_get_palette_order_cycling() {
        let order_id = Uuid::new_v4();
        let mut list: Vec<Passenger> = (0..5).map(|i| main(order_id, i, false)).collect();

        assign_group_colors(&mut list, &HashSet::new(), &palette(), Some(&scope()));

        let expected = ["red", "blue", "green", "red", "blue"];
        for (p, want) in list.iter().zip(expected) {
            assert_eq!(p.group_color.as_deref(), Some(want));
        }
    }

    #[test]
    fn test_linked_main_carries_color_to_next() {
        // A(linked), B, C with palette [red, blue, green] => red, red, blue
        let order_id = Uuid::new_v4();
        let mut list = vec![
            main(order_id, 0, true),
            main(order_id, 1, false),
            main(order_id, 2, false),
        ];

        assign_group_colors(&mut list, &HashSet::new(), &palette(), Some(&scope()));

        assert_eq!(list[0].group_color.as_deref(), Some("red"));
        assert_eq!(list[1].group_color.as_deref(), Some("red"));
        assert_eq!(list[2].group_color.as_deref(), Some("blue"));
    }

    #[test]
    fn test_chain_extends_while_links_continue() {
        let order_id = Uuid::new_v4();
        let mut list = vec![
            main(order_id, 0, true),
            main(order_id, 1, true),
            main(order_id, 2, false),
            main(order_id, 3, false),
        ];

        assign_group_colors(&mut list, &HashSet::new(), &palette(), Some(&scope()));

        assert_eq!(list[0].group_color.as_deref(), Some("red"));
        assert_eq!(list[1].group_color.as_deref(), Some("red"));
        assert_eq!(list[2].group_color.as_deref(), Some("red"));
        assert_eq!(list[3].group_color.as_deref(), Some("blue"));
    }

    #[test]
    fn test_reassignment_is_idempotent() {
        let order_id = Uuid::new_v4();
        let reserved: HashSet<String> = ["green".to_string()].into();
        let mut list = vec![
            main(order_id, 0, true),
            main(order_id, 1, false),
            main(order_id, 2, false),
        ];
        let sub = Passenger::new(order_id, 3, "Dep".into(), "Traveler".into())
            .dependent_of(list[1].id);
        list.push(sub);

        let sc = scope();
        assign_group_colors(&mut list, &reserved, &palette(), Some(&sc));
        let first_pass = colors(&list);

        assign_group_colors(&mut list, &reserved, &palette(), Some(&sc));
        assert_eq!(colors(&list), first_pass);
    }

    #[test]
    fn test_subs_inherit_their_mains_color() {
        let order_id = Uuid::new_v4();
        let main_a = main(order_id, 0, false);
        let main_b = main(order_id, 2, false);
        let sub_of_a = Passenger::new(order_id, 1, "Child".into(), "A".into())
            .dependent_of(main_a.id);
        let orphan = Passenger::new(order_id, 3, "Orphan".into(), "X".into())
            .dependent_of(Uuid::new_v4());
        let mut list = vec![main_a, sub_of_a, main_b, orphan];

        assign_group_colors(&mut list, &HashSet::new(), &palette(), Some(&scope()));

        assert_eq!(list[1].group_color, list[0].group_color);
        assert_eq!(list[2].group_color.as_deref(), Some("blue"));
        assert_eq!(list[3].group_color, None);
    }

    #[test]
    fn test_reserved_colors_are_never_picked() {
        let order_id = Uuid::new_v4();
        let reserved: HashSet<String> = ["red".to_string(), "blue".to_string()].into();
        // 3 mains against a single free token: green, then cyclic reuse of
        // green, never red/blue.
        let mut list: Vec<Passenger> = (0..3).map(|i| main(order_id, i, false)).collect();

        assign_group_colors(&mut list, &reserved, &palette(), Some(&scope()));

        for p in &list {
            assert_eq!(p.group_color.as_deref(), Some("green"));
        }
    }

    #[test]
    fn test_committed_own_reserved_color_is_kept() {
        let order_id = Uuid::new_v4();
        let reserved: HashSet<String> = ["green".to_string()].into();
        let mut committed = main(order_id, 0, false);
        committed.group_color = Some("green".to_string());
        let mut list = vec![committed, main(order_id, 1, false)];

        assign_group_colors(&mut list, &reserved, &palette(), Some(&scope()));

        assert_eq!(list[0].group_color.as_deref(), Some("green"));
        // The follower starts a fresh chain and must not collide.
        assert_eq!(list[1].group_color.as_deref(), Some("red"));
    }

    #[test]
    fn test_no_scope_nulls_every_color() {
        let order_id = Uuid::new_v4();
        let mut list = vec![main(order_id, 0, true), main(order_id, 1, false)];
        list[0].group_color = Some("red".to_string());

        assign_group_colors(&mut list, &HashSet::new(), &palette(), None);

        assert!(list.iter().all(|p| p.group_color.is_none()));
    }

    #[test]
    fn test_empty_manifest_is_a_no_op() {
        let mut list: Vec<Passenger> = Vec::new();
        assign_group_colors(&mut list, &HashSet::new(), &palette(), Some(&scope()));
        assert!(list.is_empty());
    }
}
