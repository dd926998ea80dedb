use crate::config::LayoutConfig;

use super::types::Point;

/// Places each node on a grid: ranks step along the layout axis, orders step
/// across it, and every rank is centred on the cross-axis origin.
pub(super) fn assign_positions(ranks: &[usize], orders: &[usize], config: &LayoutConfig) -> Vec<Point> {
    let rank_count = ranks.iter().map(|rank| rank + 1).max().unwrap_or(0);
    let mut widths = vec![0usize; rank_count];
    for rank in ranks {
        widths[*rank] += 1;
    }

    let rank_step = config.rank_step();
    let order_step = config.order_step();
    ranks
        .iter()
        .zip(orders)
        .map(|(rank, order)| {
            let along = *rank as f32 * rank_step;
            let offset = (widths[*rank] - 1) as f32 / 2.0;
            let cross = (*order as f32 - offset) * order_step;
            if config.direction.is_horizontal() {
                Point::new(along, cross)
            } else {
                Point::new(cross, along)
            }
        })
        .collect()
}
