use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{error::Result, histogram::Histogram};

/// A Lambert transfer between two objects, as produced by the Lambert scanner.
///
/// Fields not listed here are ignored when deserializing.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Transfer {
    pub transfer_id: i64,
    pub departure_object_id: i64,
    pub arrival_object_id: i64,
    /// Departure epoch as UTC Julian date.
    pub departure_epoch: f64,
    /// Time of flight in seconds.
    pub time_of_flight: f64,
    pub revolutions: i32,
    /// Total Δv in km/s.
    pub transfer_delta_v: f64,
}

/// Best transfer of one departure/arrival object pair.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct RankedTransfer {
    #[serde(flatten)]
    pub transfer: Transfer,
    /// 1-based rank by Δv. Ties share the lowest rank.
    pub lambert_dv_ranking: usize,
    /// `"<departure>-<arrival>"` object ids.
    pub combo: String,
}

/// Keeps the lowest-Δv transfer of every departure/arrival object pair and
/// ranks them by ascending Δv.
///
/// Transfers with a NaN Δv are ignored. Among equal Δv within a pair, the
/// first transfer in `transfers` wins.
pub fn top_list(transfers: &[Transfer]) -> Vec<RankedTransfer> {
    let mut best: HashMap<(i64, i64), &Transfer> = HashMap::new();
    for transfer in transfers.iter().filter(|t| !t.transfer_delta_v.is_nan()) {
        best.entry((transfer.departure_object_id, transfer.arrival_object_id))
            .and_modify(|current| {
                if transfer.transfer_delta_v < current.transfer_delta_v {
                    *current = transfer;
                }
            })
            .or_insert(transfer);
    }

    let mut best: Vec<&Transfer> = best.into_values().collect();
    best.sort_by(|a, b| {
        a.transfer_delta_v
            .total_cmp(&b.transfer_delta_v)
            .then(a.transfer_id.cmp(&b.transfer_id))
    });

    let mut ranked: Vec<RankedTransfer> = Vec::with_capacity(best.len());
    for (index, transfer) in best.into_iter().enumerate() {
        let lambert_dv_ranking = match ranked.last() {
            Some(previous) if previous.transfer.transfer_delta_v == transfer.transfer_delta_v => {
                previous.lambert_dv_ranking
            }
            _ => index + 1,
        };
        ranked.push(RankedTransfer {
            combo: format!(
                "{}-{}",
                transfer.departure_object_id, transfer.arrival_object_id
            ),
            transfer: transfer.clone(),
            lambert_dv_ranking,
        });
    }
    ranked
}

/// Bins the Δv of all transfers below `cutoff` (km/s).
///
/// Without a cutoff every transfer is binned.
pub fn delta_v_histogram(
    transfers: &[Transfer],
    cutoff: Option<f64>,
    bins: usize,
) -> Result<Histogram> {
    let values: Vec<f64> = transfers
        .iter()
        .map(|t| t.transfer_delta_v)
        .filter(|dv| cutoff.is_none_or(|cutoff| *dv < cutoff))
        .collect();
    Histogram::new(&values, bins, None, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn transfer(transfer_id: i64, departure: i64, arrival: i64, delta_v: f64) -> Transfer {
        Transfer {
            transfer_id,
            departure_object_id: departure,
            arrival_object_id: arrival,
            departure_epoch: 2_457_400.5,
            time_of_flight: 3600.0,
            revolutions: 0,
            transfer_delta_v: delta_v,
        }
    }

    #[test]
    fn keeps_best_transfer_per_pair() {
        let transfers = [
            transfer(1, 100, 200, 1.5),
            transfer(2, 100, 200, 0.7),
            transfer(3, 200, 100, 0.9),
            transfer(4, 100, 300, 2.0),
            transfer(5, 100, 200, 0.8),
        ];
        let top = top_list(&transfers);

        let ids: Vec<i64> = top.iter().map(|t| t.transfer.transfer_id).collect();
        assert_eq!(ids, vec![2, 3, 4]);
        assert_eq!(top[0].combo, "100-200");
        assert_eq!(top[1].combo, "200-100");
        let ranks: Vec<usize> = top.iter().map(|t| t.lambert_dv_ranking).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn ties_share_lowest_rank() {
        let transfers = [
            transfer(1, 1, 2, 0.5),
            transfer(2, 1, 3, 0.5),
            transfer(3, 1, 4, 0.2),
            transfer(4, 1, 5, 0.9),
        ];
        let ranks: Vec<usize> = top_list(&transfers)
            .iter()
            .map(|t| t.lambert_dv_ranking)
            .collect();
        assert_eq!(ranks, vec![1, 2, 2, 4]);
    }

    #[test]
    fn nan_delta_v_is_ignored() {
        let transfers = [transfer(1, 1, 2, f64::NAN), transfer(2, 1, 2, 3.0)];
        let top = top_list(&transfers);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].transfer.transfer_id, 2);
        assert!(top_list(&[]).is_empty());
    }

    #[test]
    fn cutoff_excludes_expensive_transfers() {
        let transfers: Vec<Transfer> = [0.5, 1.0, 1.5, 2.0, 30.0]
            .into_iter()
            .enumerate()
            .map(|(i, dv)| transfer(i as i64, 1, 2, dv))
            .collect();

        let histogram = delta_v_histogram(&transfers, Some(2.0), 2).unwrap();
        assert_eq!(histogram.edges(), &[0.5, 1.0, 1.5]);
        assert_eq!(histogram.counts(), &[1.0, 2.0]);

        let histogram = delta_v_histogram(&transfers, None, 3).unwrap();
        assert_eq!(histogram.total(), 5.0);

        assert_eq!(
            delta_v_histogram(&transfers, Some(0.1), 3),
            Err(Error::EmptySample)
        );
    }

    #[test]
    fn deserializes_with_extra_columns() {
        let json = r#"{
            "transfer_id": 7,
            "departure_object_id": 25544,
            "arrival_object_id": 41765,
            "departure_epoch": 2457400.5,
            "time_of_flight": 5400.0,
            "revolutions": 1,
            "transfer_delta_v": 0.42,
            "departure_delta_v_x": 0.1
        }"#;
        let transfer: Transfer = serde_json::from_str(json).unwrap();
        assert_eq!(transfer.arrival_object_id, 41765);
        assert_eq!(transfer.revolutions, 1);
    }
}
