use std::sync::Arc;

use crate::database::connection::ConnectionProvider;
use crate::database::value::{RowRef, SqlValue, Statement};
use crate::models::product::Product;
use crate::repositories::{three_tier_delete, write_validated};
use crate::services::dual_path::{settle_find, settle_list, settle_write, DualPathExecutor, ReadPlan, WritePlan};
use crate::utils::errors::DataResult;

const COLUMNS: &[&str] = &["codigo_producto", "nombre_producto", "precio_base", "unidad_medida"];

pub struct ProductRepository {
    executor: DualPathExecutor,
}

impl ProductRepository {
    pub fn new(provider: Arc<dyn ConnectionProvider>) -> Self {
        Self {
            executor: DualPathExecutor::new(provider),
        }
    }

    pub async fn insert(&self, product: &Product) -> bool {
        let plan = WritePlan::new("insertar producto")
            .procedure("sp_insertar_producto", params(product))
            .direct(Statement::with_params(
                r#"INSERT INTO producto (codigo_producto, nombre_producto, precio_base, unidad_medida)
                   VALUES ($1, $2, $3, $4)"#,
                params(product),
            ));
        settle_write("insertar producto", write_validated(&self.executor, product, plan).await)
    }

    pub async fn update(&self, product: &Product) -> bool {
        let plan = WritePlan::new("actualizar producto")
            .procedure("sp_actualizar_producto", params(product))
            .direct(Statement::with_params(
                r#"UPDATE producto
                   SET nombre_producto = $2, precio_base = $3, unidad_medida = $4
                   WHERE codigo_producto = $1"#,
                params(product),
            ))
            .require_rows();
        settle_write("actualizar producto", write_validated(&self.executor, product, plan).await)
    }

    pub async fn delete(&self, code: &str) -> bool {
        let plan = three_tier_delete(
            "eliminar producto",
            "sp_eliminar_producto",
            code,
            Statement::new("DELETE FROM producto WHERE codigo_producto = $1").bind(code),
        )
        .require_rows();
        settle_write("eliminar producto", self.executor.write(&plan).await)
    }

    pub async fn list(&self) -> Vec<Product> {
        let plan = ReadPlan::direct(
            "listar productos",
            Statement::new(
                r#"SELECT codigo_producto, nombre_producto, precio_base, unidad_medida
                   FROM producto ORDER BY nombre_producto"#,
            ),
            map_row,
        )
        .preferred(Statement::set_returning("sp_listar_productos", vec![]), COLUMNS);
        settle_list("listar productos", self.executor.read(&plan).await)
    }

    pub async fn find(&self, code: &str) -> Option<Product> {
        let plan = ReadPlan::direct(
            "buscar producto",
            Statement::new(
                r#"SELECT codigo_producto, nombre_producto, precio_base, unidad_medida
                   FROM producto WHERE codigo_producto = $1"#,
            )
            .bind(code),
            map_row,
        );
        settle_find("buscar producto", self.executor.read(&plan).await)
    }
}

fn params(p: &Product) -> Vec<SqlValue> {
    vec![
        p.code.as_str().into(),
        p.name.as_str().into(),
        SqlValue::numeric_from_f64(p.base_price),
        SqlValue::text_or_null(&p.unit),
    ]
}

fn map_row(row: &RowRef<'_>) -> DataResult<Product> {
    Ok(Product {
        code: row.text("codigo_producto")?,
        name: row.text("nombre_producto")?,
        base_price: row.f64_or_zero("precio_base")?,
        unit: row.text("unidad_medida")?,
    })
}
