use indexmap::IndexMap;
use registry::{model_converter, model_ref, model_schema};
use schema::{Converter, FieldSchema, Model, ModelInstance, ModelSchema};

/// A stock item, possibly assembled from other stock items.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StockItem {
    /// Stock keeping unit
    pub sku: Option<String>,
    /// Display name
    pub name: Option<String>,
    /// Quantity in stock across all locations
    pub quantity_on_hand: Option<f64>,
    /// Quantity per warehouse location code
    pub locations: Option<IndexMap<String, i64>>,
    /// Bill of materials
    pub components: Option<Vec<StockItem>>,
}

impl StockItem {
    /// Create a stock item with its required fields.
    pub fn new(sku: impl Into<String>, name: impl Into<String>) -> Self {
        Self { sku: Some(sku.into()), name: Some(name.into()), ..Self::default() }
    }

    /// Add a component to the bill of materials.
    pub fn with_component(mut self, component: StockItem) -> Self {
        self.components.get_or_insert_with(Vec::new).push(component);
        self
    }

    /// Number of items in the assembly tree, this one included.
    pub fn assembly_size(&self) -> usize {
        1 + self.components.iter().flatten().map(StockItem::assembly_size).sum::<usize>()
    }
}

impl Model for StockItem {
    fn schema() -> ModelSchema {
        ModelSchema::new(
            "StockItem",
            vec![
                FieldSchema::required("sku", Converter::string()),
                FieldSchema::required("name", Converter::string()),
                FieldSchema::optional("quantity_on_hand", Converter::float())
                    .rename("quantityOnHand"),
                FieldSchema::optional("locations", Converter::map_of(Converter::int())),
                FieldSchema::optional("components", Converter::list_of(model_ref::<StockItem>())),
            ],
        )
    }

    fn converter() -> &'static Converter { model_converter::<Self>() }

    fn from_instance(instance: &ModelInstance) -> Self {
        Self {
            sku: instance.value("sku"),
            name: instance.value("name"),
            quantity_on_hand: instance.value("quantity_on_hand"),
            locations: instance.value("locations"),
            components: instance.value("components"),
        }
    }

    fn to_instance(&self) -> ModelInstance {
        let mut instance = ModelInstance::new(model_schema::<Self>());
        instance.put("sku", self.sku.as_ref());
        instance.put("name", self.name.as_ref());
        instance.put("quantity_on_hand", self.quantity_on_hand.as_ref());
        instance.put("locations", self.locations.as_ref());
        instance.put("components", self.components.as_ref());
        instance
    }
}

model_views!(StockItem);
