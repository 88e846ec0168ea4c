#![forbid(unsafe_code)]

//! In-memory colony implementing every domain trait.
//!
//! [`FakeColony::sample`] builds a small, fixed scenario that the
//! end-to-end tests drive through a real `NavSession`:
//!
//! | cell | contents |
//! |---|---|
//! | `2, 3` | Electric stove (workbench) and the colonist Engie |
//! | `4..8, 4..8` | Stockpile zone 1 (priority Normal, full filter) |
//! | `10..12, 10..12` | Growing zone 1 (no priority, no filter) |
//!
//! Areas are `Home` (fixed) and `Area 1`. A bulk goods trader is visiting.
//! All fields are public so a test can reshape the scenario before it
//! builds a session.

use std::collections::{BTreeSet, HashMap};

use wlnav_widgets::area_manager::{AreaInfo, AreaRegistry};
use wlnav_widgets::bills::{BillInfo, BillStack, BillTemplate, RecipeInfo};
use wlnav_widgets::filter_tree::{Allowance, FilterNode, ThingFilterSource};
use wlnav_widgets::inspection::{InspectCategory, InspectLine, InspectObject, Inspectable};
use wlnav_widgets::map_cursor::MapView;
use wlnav_widgets::trade::{TradeDeal, Tradeable};
use wlnav_widgets::zone_actions::{CustomAction, PriorityLevel, ZoneActions, ZoneInfo};
use wlnav_widgets::{Cell, DefName, DomainError, EntityId};

pub const STOVE: EntityId = EntityId(1);
pub const STOCKPILE: EntityId = EntityId(10);
pub const GROWING: EntityId = EntityId(11);
pub const HOME_AREA: EntityId = EntityId(40);
pub const STOVE_OBJECT: EntityId = EntityId(20);
pub const ENGIE: EntityId = EntityId(21);

pub const STOVE_CELL: Cell = Cell::new(2, 3);
pub const STOCKPILE_CELL: Cell = Cell::new(5, 5);
pub const GROWING_CELL: Cell = Cell::new(11, 11);

#[derive(Debug, Clone)]
pub struct Workbench {
    pub id: EntityId,
    pub label: String,
    pub cell: Cell,
    pub recipes: Vec<RecipeInfo>,
    pub bills: Vec<BillInfo>,
    pub max_bills: usize,
}

#[derive(Debug, Clone)]
pub struct Zone {
    pub id: EntityId,
    pub label: String,
    pub cells: Vec<Cell>,
    pub priority: Option<u8>,
    /// Allowed leaf defs; `None` for zones without a storage filter.
    pub allowed: Option<BTreeSet<DefName>>,
    pub actions: Vec<CustomAction>,
}

#[derive(Debug, Clone)]
pub struct Area {
    pub id: EntityId,
    pub label: String,
    pub cells: usize,
    pub mutable: bool,
}

#[derive(Debug, Clone)]
pub struct MapObject {
    pub id: EntityId,
    pub label: String,
    pub description: String,
    pub cell: Cell,
    pub deletable: bool,
    pub categories: Vec<(InspectCategory, Vec<InspectLine>)>,
}

#[derive(Debug, Clone)]
pub struct TradeSession {
    pub trader: String,
    pub goods: Vec<Tradeable>,
}

/// A thing def or category in the catalogue; categories have children.
#[derive(Debug, Clone)]
pub struct ThingDef {
    pub def: DefName,
    pub label: String,
    pub children: Vec<ThingDef>,
}

impl ThingDef {
    pub fn item(def: &str, label: &str) -> Self {
        Self {
            def: DefName::new(def),
            label: label.to_owned(),
            children: Vec::new(),
        }
    }

    pub fn category(def: &str, label: &str, children: Vec<ThingDef>) -> Self {
        Self {
            def: DefName::new(def),
            label: label.to_owned(),
            children,
        }
    }

    fn is_category(&self) -> bool {
        !self.children.is_empty()
    }

    fn find(&self, def: &DefName) -> Option<&ThingDef> {
        if &self.def == def {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(def))
    }

    fn leaves(&self) -> Vec<DefName> {
        if self.is_category() {
            self.children.iter().flat_map(ThingDef::leaves).collect()
        } else {
            vec![self.def.clone()]
        }
    }
}

#[derive(Debug, Clone)]
pub struct FakeColony {
    pub size: (i32, i32),
    pub terrain: HashMap<Cell, String>,
    pub workbenches: Vec<Workbench>,
    pub zones: Vec<Zone>,
    pub areas: Vec<Area>,
    pub area_limit: usize,
    pub objects: Vec<MapObject>,
    pub trade: Option<TradeSession>,
    pub silver: i64,
    pub catalogue: Vec<ThingDef>,
    pub priority_levels: Vec<PriorityLevel>,
    next_id: u64,
}

impl Default for FakeColony {
    fn default() -> Self {
        Self::sample()
    }
}

fn recipe(def: &str, label: &str, available: bool, detail: &str) -> RecipeInfo {
    RecipeInfo {
        recipe: DefName::new(def),
        label: label.to_owned(),
        available,
        detail: detail.to_owned(),
    }
}

fn square(x: std::ops::Range<i32>, y: std::ops::Range<i32>) -> Vec<Cell> {
    x.flat_map(|x| y.clone().map(move |y| Cell::new(x, y))).collect()
}

fn text(line: &str) -> InspectLine {
    InspectLine::Text(line.to_owned())
}

fn action(def: &str, label: &str) -> InspectLine {
    InspectLine::Action {
        def: DefName::new(def),
        label: label.to_owned(),
        enabled: true,
    }
}

fn category(def: &str, label: &str, is_tab: bool) -> InspectCategory {
    InspectCategory {
        def: DefName::new(def),
        label: label.to_owned(),
        is_tab,
    }
}

impl FakeColony {
    /// An empty 20 by 20 map of soil.
    pub fn empty() -> Self {
        Self {
            size: (20, 20),
            terrain: HashMap::new(),
            workbenches: Vec::new(),
            zones: Vec::new(),
            areas: Vec::new(),
            area_limit: 10,
            objects: Vec::new(),
            trade: None,
            silver: 0,
            catalogue: Vec::new(),
            priority_levels: Vec::new(),
            next_id: 100,
        }
    }

    pub fn sample() -> Self {
        let catalogue = vec![
            ThingDef::category(
                "Apparel",
                "Apparel",
                vec![
                    ThingDef::category(
                        "Gear",
                        "Gear",
                        vec![ThingDef::item("Parka", "Parka"), ThingDef::item("Tuque", "Tuque")],
                    ),
                    ThingDef::item("Duster", "Duster"),
                ],
            ),
            ThingDef::category(
                "Food",
                "Food",
                vec![ThingDef::item("Rice", "Rice"), ThingDef::item("Corn", "Corn")],
            ),
        ];
        let everything: BTreeSet<DefName> = catalogue.iter().flat_map(ThingDef::leaves).collect();

        let mut terrain = HashMap::new();
        terrain.insert(Cell::new(0, 0), "Granite wall".to_owned());
        terrain.insert(Cell::new(1, 0), "Granite wall".to_owned());

        Self {
            terrain,
            workbenches: vec![Workbench {
                id: STOVE,
                label: "Electric stove".to_owned(),
                cell: STOVE_CELL,
                recipes: vec![
                    recipe("SimpleMeal", "Simple meal", true, "10 nutrition"),
                    recipe("FineMeal", "Fine meal", true, "10 nutrition, 5 vegetables"),
                    recipe("LavishMeal", "Lavish meal", false, "requires Cooking 12"),
                ],
                bills: vec![BillInfo {
                    id: EntityId(2),
                    recipe: DefName::new("SimpleMeal"),
                    label: "Simple meal".to_owned(),
                    repeat: "do 5 times".to_owned(),
                    suspended: false,
                    ingredients: String::new(),
                }],
                max_bills: 3,
            }],
            zones: vec![
                Zone {
                    id: STOCKPILE,
                    label: "Stockpile zone 1".to_owned(),
                    cells: square(4..8, 4..8),
                    priority: Some(2),
                    allowed: Some(everything),
                    actions: vec![CustomAction {
                        def: DefName::new("ClearFilter"),
                        label: "Disallow everything".to_owned(),
                        enabled: true,
                    }],
                },
                Zone {
                    id: GROWING,
                    label: "Growing zone 1".to_owned(),
                    cells: square(10..12, 10..12),
                    priority: None,
                    allowed: None,
                    actions: vec![CustomAction {
                        def: DefName::new("Harvest"),
                        label: "Harvest now".to_owned(),
                        enabled: false,
                    }],
                },
            ],
            areas: vec![
                Area {
                    id: HOME_AREA,
                    label: "Home".to_owned(),
                    cells: 120,
                    mutable: false,
                },
                Area {
                    id: EntityId(41),
                    label: "Area 1".to_owned(),
                    cells: 4,
                    mutable: true,
                },
            ],
            objects: vec![
                MapObject {
                    id: STOVE_OBJECT,
                    label: "Electric stove".to_owned(),
                    description: "workbench".to_owned(),
                    cell: STOVE_CELL,
                    deletable: true,
                    categories: vec![
                        (
                            category("Stats", "Stats", false),
                            vec![text("Hit points 180 of 180"), text("Work speed 100%")],
                        ),
                        (category("Power", "Power", false), vec![action("TogglePower", "Turn off")]),
                        (
                            category("Log", "Log", true),
                            vec![text("Built by Engie"), action("ClearLog", "Clear log")],
                        ),
                    ],
                },
                MapObject {
                    id: ENGIE,
                    label: "Engie".to_owned(),
                    description: "colonist".to_owned(),
                    cell: STOVE_CELL,
                    deletable: false,
                    categories: vec![
                        (category("Needs", "Needs", false), vec![text("Mood 72%")]),
                        (category("Health", "Health", false), vec![text("Healthy")]),
                    ],
                },
            ],
            trade: Some(TradeSession {
                trader: "Bulk goods trader".to_owned(),
                goods: vec![
                    Tradeable {
                        id: EntityId(30),
                        label: "Steel".to_owned(),
                        offered: 0,
                        available: 200,
                        unit_price: 2,
                    },
                    Tradeable {
                        id: EntityId(31),
                        label: "Medicine".to_owned(),
                        offered: 0,
                        available: 10,
                        unit_price: 18,
                    },
                ],
            }),
            silver: 100,
            catalogue,
            priority_levels: [(1, "Low"), (2, "Normal"), (3, "Preferred"), (4, "Important"), (5, "Critical")]
                .into_iter()
                .map(|(value, label)| PriorityLevel {
                    value,
                    label: label.to_owned(),
                })
                .collect(),
            ..Self::empty()
        }
    }

    fn allocate(&mut self) -> EntityId {
        self.next_id += 1;
        EntityId(self.next_id)
    }

    pub fn bench(&self, bench: EntityId) -> Option<&Workbench> {
        self.workbenches.iter().find(|w| w.id == bench)
    }

    fn bench_mut(&mut self, bench: EntityId) -> Result<&mut Workbench, DomainError> {
        self.workbenches.iter_mut().find(|w| w.id == bench).ok_or(DomainError::Missing)
    }

    pub fn zone_state(&self, zone: EntityId) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == zone)
    }

    fn zone_mut(&mut self, zone: EntityId) -> Result<&mut Zone, DomainError> {
        self.zones.iter_mut().find(|z| z.id == zone).ok_or(DomainError::Missing)
    }

    fn area_mut(&mut self, area: EntityId) -> Result<&mut Area, DomainError> {
        self.areas.iter_mut().find(|a| a.id == area).ok_or(DomainError::Missing)
    }

    fn object(&self, object: EntityId) -> Result<&MapObject, DomainError> {
        self.objects.iter().find(|o| o.id == object).ok_or(DomainError::Missing)
    }

    fn object_mut(&mut self, object: EntityId) -> Result<&mut MapObject, DomainError> {
        self.objects.iter_mut().find(|o| o.id == object).ok_or(DomainError::Missing)
    }

    fn thing(&self, def: &DefName) -> Option<&ThingDef> {
        self.catalogue.iter().find_map(|t| t.find(def))
    }

    fn filter_node(thing: &ThingDef, allowed: &BTreeSet<DefName>) -> FilterNode {
        let leaves = thing.leaves();
        let count = leaves.iter().filter(|l| allowed.contains(*l)).count();
        let allowance = if count == leaves.len() {
            Allowance::Allowed
        } else if count == 0 {
            Allowance::Disallowed
        } else {
            Allowance::Partial
        };
        FilterNode {
            def: thing.def.clone(),
            label: thing.label.clone(),
            is_category: thing.is_category(),
            allowance,
        }
    }

    /// Whether `def` is allowed in `zone`'s filter.
    pub fn is_allowed(&self, zone: EntityId, def: &str) -> bool {
        self.zone_state(zone)
            .and_then(|z| z.allowed.as_ref())
            .is_some_and(|allowed| allowed.contains(&DefName::new(def)))
    }
}

impl BillStack for FakeColony {
    fn workbench_label(&self, bench: EntityId) -> Option<String> {
        self.bench(bench).map(|w| w.label.clone())
    }

    fn bills(&self, bench: EntityId) -> Vec<BillInfo> {
        self.bench(bench).map(|w| w.bills.clone()).unwrap_or_default()
    }

    fn recipes(&self, bench: EntityId) -> Vec<RecipeInfo> {
        self.bench(bench).map(|w| w.recipes.clone()).unwrap_or_default()
    }

    fn accepts_recipe(&self, bench: EntityId, recipe: &DefName) -> bool {
        self.bench(bench).is_some_and(|w| w.recipes.iter().any(|r| &r.recipe == recipe))
    }

    fn add_bill(&mut self, bench: EntityId, recipe: &DefName) -> Result<EntityId, DomainError> {
        let id = self.allocate();
        let workbench = self.bench_mut(bench)?;
        let Some(info) = workbench.recipes.iter().find(|r| &r.recipe == recipe).cloned() else {
            return Err(DomainError::Rejected(format!("{} cannot make that", workbench.label)));
        };
        if workbench.bills.len() >= workbench.max_bills {
            return Err(DomainError::Rejected("Bill stack is full".to_owned()));
        }
        workbench.bills.push(BillInfo {
            id,
            recipe: info.recipe,
            label: info.label,
            repeat: "do 1 time".to_owned(),
            suspended: false,
            ingredients: String::new(),
        });
        Ok(id)
    }

    fn remove_bill(&mut self, bench: EntityId, bill: EntityId) -> Result<(), DomainError> {
        let workbench = self.bench_mut(bench)?;
        let index = workbench.bills.iter().position(|b| b.id == bill).ok_or(DomainError::Missing)?;
        workbench.bills.remove(index);
        Ok(())
    }

    fn set_suspended(&mut self, bench: EntityId, bill: EntityId, suspended: bool) -> Result<(), DomainError> {
        let workbench = self.bench_mut(bench)?;
        let bill = workbench.bills.iter_mut().find(|b| b.id == bill).ok_or(DomainError::Missing)?;
        bill.suspended = suspended;
        Ok(())
    }

    fn move_bill(&mut self, bench: EntityId, bill: EntityId, offset: isize) -> Result<(), DomainError> {
        let workbench = self.bench_mut(bench)?;
        let from = workbench.bills.iter().position(|b| b.id == bill).ok_or(DomainError::Missing)?;
        let last = workbench.bills.len().saturating_sub(1);
        let to = from.saturating_add_signed(offset).min(last);
        let moved = workbench.bills.remove(from);
        workbench.bills.insert(to, moved);
        Ok(())
    }

    fn copy_bill(&self, bench: EntityId, bill: EntityId) -> Result<BillTemplate, DomainError> {
        let workbench = self.bench(bench).ok_or(DomainError::Missing)?;
        let bill = workbench.bills.iter().find(|b| b.id == bill).ok_or(DomainError::Missing)?;
        Ok(BillTemplate {
            recipe: bill.recipe.clone(),
            label: bill.label.clone(),
            repeat: bill.repeat.clone(),
        })
    }

    fn paste_bill(&mut self, bench: EntityId, template: &BillTemplate) -> Result<EntityId, DomainError> {
        let id = self.add_bill(bench, &template.recipe)?;
        let workbench = self.bench_mut(bench)?;
        if let Some(bill) = workbench.bills.iter_mut().find(|b| b.id == id) {
            bill.repeat = template.repeat.clone();
        }
        Ok(id)
    }
}

impl ThingFilterSource for FakeColony {
    fn filter_label(&self, filter: EntityId) -> Option<String> {
        self.zone_state(filter)
            .filter(|z| z.allowed.is_some())
            .map(|z| z.label.clone())
    }

    fn filter_roots(&self, filter: EntityId) -> Vec<FilterNode> {
        let Some(allowed) = self.zone_state(filter).and_then(|z| z.allowed.as_ref()) else {
            return Vec::new();
        };
        self.catalogue.iter().map(|t| Self::filter_node(t, allowed)).collect()
    }

    fn filter_children(&self, filter: EntityId, category: &DefName) -> Result<Vec<FilterNode>, DomainError> {
        let allowed = self
            .zone_state(filter)
            .and_then(|z| z.allowed.as_ref())
            .ok_or(DomainError::Missing)?;
        let thing = self.thing(category).ok_or(DomainError::Missing)?;
        Ok(thing.children.iter().map(|c| Self::filter_node(c, allowed)).collect())
    }

    fn set_allowed(&mut self, filter: EntityId, def: &DefName, allowed: bool) -> Result<(), DomainError> {
        let leaves = self.thing(def).ok_or(DomainError::Missing)?.leaves();
        let set = self.zone_mut(filter)?.allowed.as_mut().ok_or(DomainError::Missing)?;
        for leaf in leaves {
            if allowed {
                set.insert(leaf);
            } else {
                set.remove(&leaf);
            }
        }
        Ok(())
    }
}

impl ZoneActions for FakeColony {
    fn zone(&self, zone: EntityId) -> Option<ZoneInfo> {
        self.zone_state(zone).map(|z| ZoneInfo {
            id: z.id,
            label: z.label.clone(),
            priority: z.priority,
            has_filter: z.allowed.is_some(),
            actions: z.actions.clone(),
        })
    }

    fn priority_levels(&self) -> Vec<PriorityLevel> {
        self.priority_levels.clone()
    }

    fn rename_zone(&mut self, zone: EntityId, name: &str) -> Result<(), DomainError> {
        if self.zones.iter().any(|z| z.id != zone && z.label == name) {
            return Err(DomainError::Rejected(format!("{name} is already taken")));
        }
        self.zone_mut(zone)?.label = name.to_owned();
        Ok(())
    }

    fn set_priority(&mut self, zone: EntityId, priority: u8) -> Result<(), DomainError> {
        let zone = self.zone_mut(zone)?;
        if zone.priority.is_none() {
            return Err(DomainError::Rejected(format!("{} has no priority", zone.label)));
        }
        zone.priority = Some(priority);
        Ok(())
    }

    fn delete_zone(&mut self, zone: EntityId) -> Result<(), DomainError> {
        let index = self.zones.iter().position(|z| z.id == zone).ok_or(DomainError::Missing)?;
        self.zones.remove(index);
        Ok(())
    }

    fn run_zone_action(&mut self, zone: EntityId, action: &DefName) -> Result<(), DomainError> {
        let zone = self.zone_mut(zone)?;
        match action.as_str() {
            "ClearFilter" => {
                if let Some(allowed) = zone.allowed.as_mut() {
                    allowed.clear();
                }
                Ok(())
            }
            other => Err(DomainError::Failed(format!("unknown zone action {other}"))),
        }
    }
}

impl AreaRegistry for FakeColony {
    fn areas(&self) -> Vec<AreaInfo> {
        self.areas
            .iter()
            .map(|a| AreaInfo {
                id: a.id,
                label: a.label.clone(),
                cells: a.cells,
                mutable: a.mutable,
            })
            .collect()
    }

    fn create_area(&mut self) -> Result<EntityId, DomainError> {
        if self.areas.len() >= self.area_limit {
            return Err(DomainError::Rejected("Too many areas".to_owned()));
        }
        let n = (1..)
            .find(|n| !self.areas.iter().any(|a| a.label == format!("Area {n}")))
            .unwrap_or(1);
        let id = self.allocate();
        self.areas.push(Area {
            id,
            label: format!("Area {n}"),
            cells: 0,
            mutable: true,
        });
        Ok(id)
    }

    fn rename_area(&mut self, area: EntityId, name: &str) -> Result<(), DomainError> {
        let area = self.area_mut(area)?;
        if !area.mutable {
            return Err(DomainError::Rejected(format!("{} cannot be renamed", area.label)));
        }
        area.label = name.to_owned();
        Ok(())
    }

    fn delete_area(&mut self, area: EntityId) -> Result<(), DomainError> {
        let index = self.areas.iter().position(|a| a.id == area).ok_or(DomainError::Missing)?;
        if !self.areas[index].mutable {
            return Err(DomainError::Rejected(format!("{} cannot be deleted", self.areas[index].label)));
        }
        self.areas.remove(index);
        Ok(())
    }

    fn duplicate_area(&mut self, area: EntityId) -> Result<EntityId, DomainError> {
        if self.areas.len() >= self.area_limit {
            return Err(DomainError::Rejected("Too many areas".to_owned()));
        }
        let source = self.areas.iter().find(|a| a.id == area).cloned().ok_or(DomainError::Missing)?;
        let id = self.allocate();
        self.areas.push(Area {
            id,
            label: format!("{} copy", source.label),
            cells: source.cells,
            mutable: true,
        });
        Ok(id)
    }
}

impl Inspectable for FakeColony {
    fn objects_at(&self, cell: Cell) -> Vec<InspectObject> {
        self.objects
            .iter()
            .filter(|o| o.cell == cell)
            .map(|o| InspectObject {
                id: o.id,
                label: o.label.clone(),
                description: o.description.clone(),
                deletable: o.deletable,
            })
            .collect()
    }

    fn categories(&self, object: EntityId) -> Result<Vec<InspectCategory>, DomainError> {
        Ok(self.object(object)?.categories.iter().map(|(c, _)| c.clone()).collect())
    }

    fn category_lines(&self, object: EntityId, category: &DefName) -> Result<Vec<InspectLine>, DomainError> {
        self.object(object)?
            .categories
            .iter()
            .find(|(c, _)| &c.def == category)
            .map(|(_, lines)| lines.clone())
            .ok_or(DomainError::Missing)
    }

    fn run_inspect_action(&mut self, object: EntityId, action: &DefName) -> Result<(), DomainError> {
        let object = self.object_mut(object)?;
        for (_, lines) in &mut object.categories {
            match action.as_str() {
                "TogglePower" => {
                    for line in lines.iter_mut() {
                        if let InspectLine::Action { def, label, .. } = line
                            && def == action
                        {
                            *label = if label == "Turn off" { "Turn on" } else { "Turn off" }.to_owned();
                        }
                    }
                }
                "ClearLog" if lines.iter().any(|l| matches!(l, InspectLine::Action { def, .. } if def == action)) => {
                    *lines = vec![text("Log is empty")];
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn delete_object(&mut self, object: EntityId) -> Result<(), DomainError> {
        let index = self.objects.iter().position(|o| o.id == object).ok_or(DomainError::Missing)?;
        if !self.objects[index].deletable {
            return Err(DomainError::Rejected(format!("{} cannot be removed", self.objects[index].label)));
        }
        self.objects.remove(index);
        Ok(())
    }
}

impl TradeDeal for FakeColony {
    fn trader_label(&self) -> Option<String> {
        self.trade.as_ref().map(|t| t.trader.clone())
    }

    fn tradeables(&self) -> Vec<Tradeable> {
        self.trade.as_ref().map(|t| t.goods.clone()).unwrap_or_default()
    }

    fn balance(&self) -> i64 {
        -self
            .tradeables()
            .iter()
            .map(|t| i64::from(t.offered) * i64::from(t.unit_price))
            .sum::<i64>()
    }

    fn set_offer(&mut self, item: EntityId, quantity: u32) -> Result<(), DomainError> {
        let trade = self.trade.as_mut().ok_or(DomainError::Missing)?;
        let good = trade.goods.iter_mut().find(|g| g.id == item).ok_or(DomainError::Missing)?;
        if quantity > good.available {
            return Err(DomainError::Rejected(format!("Only {} available", good.available)));
        }
        good.offered = quantity;
        Ok(())
    }

    fn reset_offers(&mut self) {
        if let Some(trade) = self.trade.as_mut() {
            for good in &mut trade.goods {
                good.offered = 0;
            }
        }
    }

    fn accept(&mut self) -> Result<(), DomainError> {
        let cost = -self.balance();
        if self.trade.is_none() {
            return Err(DomainError::Missing);
        }
        if cost > self.silver {
            return Err(DomainError::Rejected("Not enough silver".to_owned()));
        }
        self.silver -= cost;
        self.trade = None;
        Ok(())
    }
}

impl MapView for FakeColony {
    fn map_size(&self) -> (i32, i32) {
        self.size
    }

    fn describe_cell(&self, cell: Cell) -> String {
        let mut parts: Vec<String> = self
            .objects
            .iter()
            .filter(|o| o.cell == cell)
            .map(|o| o.label.clone())
            .collect();
        if let Some(zone) = self.zones.iter().find(|z| z.cells.contains(&cell)) {
            parts.push(zone.label.clone());
        }
        parts.push(self.terrain.get(&cell).cloned().unwrap_or_else(|| "Soil".to_owned()));
        parts.join(", ")
    }

    fn workbench_at(&self, cell: Cell) -> Option<EntityId> {
        self.workbenches.iter().find(|w| w.cell == cell).map(|w| w.id)
    }

    fn zone_at(&self, cell: Cell) -> Option<EntityId> {
        self.zones.iter().find(|z| z.cells.contains(&cell)).map(|z| z.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_allowance_follows_leaves() {
        let mut colony = FakeColony::sample();
        let roots = colony.filter_roots(STOCKPILE);
        assert_eq!(roots[0].allowance, Allowance::Allowed);

        colony.set_allowed(STOCKPILE, &DefName::new("Parka"), false).unwrap();
        let roots = colony.filter_roots(STOCKPILE);
        assert_eq!(roots[0].allowance, Allowance::Partial);

        colony.set_allowed(STOCKPILE, &DefName::new("Apparel"), false).unwrap();
        let roots = colony.filter_roots(STOCKPILE);
        assert_eq!(roots[0].allowance, Allowance::Disallowed);
        assert!(colony.is_allowed(STOCKPILE, "Rice"));
    }

    #[test]
    fn bill_stack_limit_rejects() {
        let mut colony = FakeColony::sample();
        let meal = DefName::new("SimpleMeal");
        colony.add_bill(STOVE, &meal).unwrap();
        colony.add_bill(STOVE, &meal).unwrap();
        assert!(matches!(colony.add_bill(STOVE, &meal), Err(DomainError::Rejected(_))));
    }

    #[test]
    fn cell_description_stacks_contents() {
        let colony = FakeColony::sample();
        assert_eq!(colony.describe_cell(STOVE_CELL), "Electric stove, Engie, Soil");
        assert_eq!(colony.describe_cell(STOCKPILE_CELL), "Stockpile zone 1, Soil");
        assert_eq!(colony.describe_cell(Cell::new(0, 0)), "Granite wall");
    }

    #[test]
    fn accept_needs_silver() {
        let mut colony = FakeColony::sample();
        colony.set_offer(EntityId(31), 10).unwrap();
        assert_eq!(colony.balance(), -180);
        assert!(matches!(colony.accept(), Err(DomainError::Rejected(_))));
        colony.set_offer(EntityId(31), 5).unwrap();
        colony.accept().unwrap();
        assert_eq!(colony.silver, 10);
        assert!(colony.trader_label().is_none());
    }

    #[test]
    fn new_area_takes_next_free_number() {
        let mut colony = FakeColony::sample();
        let id = colony.create_area().unwrap();
        assert_eq!(colony.areas().last().map(|a| (a.id, a.label.clone())), Some((id, "Area 2".to_owned())));
    }
}
