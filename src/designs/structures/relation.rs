use super::{Structure, StructureProps, empty_add_button};
use crate::config::StartMode;
use crate::designs::components::{btn_add, btn_remove, btns_group, decor_group, items_group};
use crate::layout::PositionClass;
use crate::layout::force::{Forces, classify, initial_positions, simulate, star_links};
use crate::scene::{ElementRole, SceneNode, format_number, group, path};
use std::f32::consts::PI;

/// Items on a ring, with buttons on an inner ring.
#[derive(Debug, Clone, Copy)]
pub struct RelationCircle;

impl Structure for RelationCircle {
    fn name(&self) -> &'static str {
        "relation-circle"
    }

    fn render(&self, props: &StructureProps<'_>) -> SceneNode {
        let items = &props.data.items;
        if items.is_empty() {
            return props.frame(group().child(btns_group(vec![empty_add_button()])));
        }
        let btn = props.btn_bounds();
        let cell = props.item_bounds(props.first_item(PositionClass::Normal));
        let size = cell.width.max(cell.height);
        let radius = props.layout.radius.max(size);
        let center = radius + size / 2.0;
        let button_radius = radius - size / 2.0 - 20.0;
        let count = items.len() as f32;

        // Every item gets an equal share of the ring; weights are kept so
        // differently sized items would still divide it proportionally.
        let weights: Vec<f32> = items.iter().map(|_| (cell.width + cell.height) / 2.0).collect();
        let total: f32 = weights.iter().sum();
        let mut angle = match props.layout.start_mode {
            StartMode::Equal => -PI / 2.0,
            StartMode::Top => -PI / 2.0 + PI / count,
        };

        let on_ring = |r: f32, theta: f32, w: f32, h: f32| {
            (center + r * theta.cos() - w / 2.0, center + r * theta.sin() - h / 2.0)
        };

        let mut item_nodes = Vec::with_capacity(items.len());
        let mut buttons = Vec::new();
        for (index, weight) in weights.iter().enumerate() {
            let portion = weight / total * 2.0 * PI;
            let theta = angle + portion / 2.0;
            angle += portion;

            let (x, y) = on_ring(radius, theta, cell.width, cell.height);
            item_nodes.push(props.item.render(&props.item_props(vec![index]).at(x, y)));
            let (bx, by) = on_ring(button_radius, theta, btn.width, btn.height);
            buttons.push(btn_remove(&[index]).at(bx, by));
        }
        for index in 0..items.len() {
            let theta = (index as f32 + 0.5) * 2.0 * PI / count - PI / 2.0;
            let (bx, by) = on_ring(button_radius, theta, btn.width, btn.height);
            buttons.push(btn_add(&[index + 1]).at(bx, by));
        }

        props.frame(
            group()
                .child(items_group(item_nodes))
                .child(btns_group(buttons)),
        )
    }
}

/// Force-directed star around the first item.
#[derive(Debug, Clone, Copy)]
pub struct RelationNetwork;

impl Structure for RelationNetwork {
    fn name(&self) -> &'static str {
        "relation-network"
    }

    fn render(&self, props: &StructureProps<'_>) -> SceneNode {
        let items = &props.data.items;
        if items.is_empty() {
            return props.frame(group().child(items_group(Vec::new())));
        }
        let cell = props.item_bounds(props.first_item(PositionClass::Center));
        let links = star_links(items.len());
        let forces = Forces::network(props.layout.spacing, cell.width.max(cell.height) / 2.0 + 10.0);
        let positions = simulate(&initial_positions(items.len()), &links, &forces, props.layout.ticks);

        let min_x = positions.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let min_y = positions.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let offset_x = (-min_x + cell.width / 2.0).max(0.0);
        let offset_y = (-min_y + cell.height / 2.0).max(0.0);

        let item_nodes = positions
            .iter()
            .enumerate()
            .map(|(index, point)| {
                let (horizontal, vertical) = classify(point.x, point.y);
                let item = props
                    .item_props(vec![index])
                    .at(
                        point.x + offset_x - cell.width / 2.0,
                        point.y + offset_y - cell.height / 2.0,
                    )
                    .position(horizontal, vertical);
                props.item.render(&item)
            })
            .collect();

        let edges = if props.layout.show_connections {
            links
                .iter()
                .map(|link| {
                    let (from, to) = (positions[link.source], positions[link.target]);
                    let d = format!(
                        "M {} {} L {} {}",
                        format_number(from.x + offset_x),
                        format_number(from.y + offset_y),
                        format_number(to.x + offset_x),
                        format_number(to.y + offset_y)
                    );
                    path(d)
                        .role(ElementRole::Decoration)
                        .prop("stroke", props.layout.connector_color.as_str())
                        .prop("stroke-width", 2.0)
                        .prop("stroke-opacity", 0.6)
                })
                .collect()
        } else {
            Vec::new()
        };

        props.frame(
            group()
                .child(decor_group(edges))
                .child(items_group(item_nodes)),
        )
    }
}
