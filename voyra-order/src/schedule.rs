use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;
use voyra_catalog::tour::{Departure, Tour};

use crate::models::{Order, OrderStatus};

/// Orders for one tour on one departure day, with seat aggregates the
/// dashboard prints in the group header.
#[derive(Debug, Clone, Serialize)]
pub struct TourBucket {
    pub tour_id: Uuid,
    pub tour_name: Option<String>,
    pub seat_capacity: Option<i32>,
    pub seats_booked: i32,
    pub seats_pending: i32,
    pub seats_confirmed: i32,
    pub seats_paid: i32,
    pub seats_available: Option<i32>,
    pub orders: Vec<Order>,
}

/// One departure day of the schedule view.
#[derive(Debug, Clone, Serialize)]
pub struct DepartureDay {
    pub departure_date: NaiveDate,
    pub seats_booked: i32,
    pub tours: Vec<TourBucket>,
}

/// Fold a flat order list into the date → tour → orders view.
///
/// Days come out ascending; inside a day, tours sort by catalog name with
/// unknown tours (not in the catalog slice) trailing under their raw id.
/// Cancelled orders are listed but excluded from every seat total.
pub fn group_schedule(
    orders: Vec<Order>,
    tours: &[Tour],
    departures: &[Departure],
) -> Vec<DepartureDay> {
    let tour_names: HashMap<Uuid, &str> =
        tours.iter().map(|t| (t.id, t.name.as_str())).collect();
    let capacities: HashMap<(Uuid, NaiveDate), i32> = departures
        .iter()
        .map(|d| ((d.tour_id, d.departure_date), d.seat_capacity))
        .collect();

    let mut days: BTreeMap<NaiveDate, HashMap<Uuid, Vec<Order>>> = BTreeMap::new();
    for order in orders {
        days.entry(order.departure_date)
            .or_default()
            .entry(order.tour_id)
            .or_default()
            .push(order);
    }

    days.into_iter()
        .map(|(departure_date, by_tour)| {
            let mut buckets: Vec<TourBucket> = by_tour
                .into_iter()
                .map(|(tour_id, mut orders)| {
                    orders.sort_by_key(|o| o.created_at);

                    let mut seats_pending = 0;
                    let mut seats_confirmed = 0;
                    let mut seats_paid = 0;
                    for order in orders.iter().filter(|o| o.status.holds_seats()) {
                        match order.status {
                            OrderStatus::Pending => seats_pending += order.seats,
                            OrderStatus::Confirmed => seats_confirmed += order.seats,
                            OrderStatus::Paid | OrderStatus::Completed => seats_paid += order.seats,
                            OrderStatus::Cancelled => {}
                        }
                    }
                    let seats_booked = seats_pending + seats_confirmed + seats_paid;
                    let seat_capacity = capacities.get(&(tour_id, departure_date)).copied();

                    TourBucket {
                        tour_id,
                        tour_name: tour_names.get(&tour_id).map(|n| n.to_string()),
                        seat_capacity,
                        seats_booked,
                        seats_pending,
                        seats_confirmed,
                        seats_paid,
                        seats_available: seat_capacity.map(|cap| cap - seats_booked),
                        orders,
                    }
                })
                .collect();

            buckets.sort_by(|a, b| match (&a.tour_name, &b.tour_name) {
                (Some(x), Some(y)) => x.cmp(y).then_with(|| a.tour_id.cmp(&b.tour_id)),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.tour_id.cmp(&b.tour_id),
            });

            let seats_booked = buckets.iter().map(|b| b.seats_booked).sum();
            DepartureDay {
                departure_date,
                seats_booked,
                tours: buckets,
            }
        })
        .collect()
}
