use std::time::Duration;

use geo::Point;
use log::{debug, info};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use crate::geo::Bounds;
use crate::graph::{Edge, Graph, Node, Restrictions, RoadClass};
use crate::store::error::StoreError;
use crate::store::record::{CachedRoute, EdgeRecord, NodeRecord};

/// Connection-pool sizing for the backing store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: String,
    pub max_connections: u32,
    pub max_lifetime: Duration,
    pub idle_timeout: Duration,
}

/// Geography-indexed relational store of nodes, edges, zip mappings and
/// the route-result cache.
pub struct SpatialStore {
    pool: PgPool,
}

impl SpatialStore {
    /// Builds the bounded pool and verifies liveness eagerly; an
    /// unreachable backing store fails fast here rather than on first
    /// query.
    pub async fn connect(config: &StoreConfig) -> Result<SpatialStore, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .max_lifetime(config.max_lifetime)
            .idle_timeout(config.idle_timeout)
            .test_before_acquire(true)
            .connect(&config.url)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;
        info!(
            "spatial store connected (pool of {})",
            config.max_connections
        );

        Ok(SpatialStore { pool })
    }

    pub fn from_pool(pool: PgPool) -> SpatialStore {
        SpatialStore { pool }
    }

    /// Loads the nodes intersecting `bounds` together with every edge
    /// whose origin lies in that set. Edges may point outside the
    /// region; the returned graph is directionally partial at its
    /// boundary.
    pub async fn load_graph_for_region(&self, bounds: Bounds) -> Result<Graph, StoreError> {
        let nodes = sqlx::query(
            r#"
            SELECT id, osm_id,
                   ST_X(location::geometry) AS lon,
                   ST_Y(location::geometry) AS lat
            FROM nodes
            WHERE ST_Intersects(location::geometry, ST_MakeEnvelope($1, $2, $3, $4, 4326))
            "#,
        )
        .bind(bounds.min_lon)
        .bind(bounds.min_lat)
        .bind(bounds.max_lon)
        .bind(bounds.max_lat)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(node_from_row)
        .collect::<Result<Vec<_>, _>>()?;

        let edges = sqlx::query(
            r#"
            SELECT e.id, e.from_node_id, e.to_node_id, e.distance, e.travel_time,
                   e.max_height, e.max_weight, e.truck_allowed, e.road_type, e.osm_way_id
            FROM edges e
            JOIN nodes n ON n.id = e.from_node_id
            WHERE ST_Intersects(n.location::geometry, ST_MakeEnvelope($1, $2, $3, $4, 4326))
            "#,
        )
        .bind(bounds.min_lon)
        .bind(bounds.min_lat)
        .bind(bounds.max_lon)
        .bind(bounds.max_lat)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(edge_from_row)
        .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "loaded region graph: {} nodes, {} edges",
            nodes.len(),
            edges.len()
        );

        Ok(Graph::new(nodes, edges))
    }

    /// The single node nearest to the query position. `NotFound` only
    /// when the node table is empty.
    pub async fn find_nearest_node(&self, lon: f64, lat: f64) -> Result<Node, StoreError> {
        sqlx::query(
            r#"
            SELECT id, osm_id,
                   ST_X(location::geometry) AS lon,
                   ST_Y(location::geometry) AS lat
            FROM nodes
            ORDER BY location <-> ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography
            LIMIT 1
            "#,
        )
        .bind(lon)
        .bind(lat)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
        .and_then(|row| node_from_row(&row))
    }

    pub async fn node_id_for_zip(&self, zip: &str) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT node_id FROM zip_nodes WHERE zip_code = $1")
            .bind(zip)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;

        Ok(row.try_get("node_id")?)
    }

    pub async fn node_for_zip(&self, zip: &str) -> Result<Node, StoreError> {
        sqlx::query(
            r#"
            SELECT n.id, n.osm_id,
                   ST_X(n.location::geometry) AS lon,
                   ST_Y(n.location::geometry) AS lat
            FROM zip_nodes z
            JOIN nodes n ON n.id = z.node_id
            WHERE z.zip_code = $1
            "#,
        )
        .bind(zip)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
        .and_then(|row| node_from_row(&row))
    }

    /// Upserts a cache row, refreshing `calculated_at` to now and
    /// pushing `expires_at` out by the fixed 48-hour window.
    pub async fn save_cached_route(
        &self,
        origin_zip: &str,
        dest_zip: &str,
        distance: f64,
        travel_time: f64,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO cached_routes (origin_zip, dest_zip, distance, travel_time,
                                       calculated_at, expires_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW() + INTERVAL '48 hours')
            ON CONFLICT (origin_zip, dest_zip) DO UPDATE SET
                distance = EXCLUDED.distance,
                travel_time = EXCLUDED.travel_time,
                calculated_at = EXCLUDED.calculated_at,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(origin_zip)
        .bind(dest_zip)
        .bind(distance)
        .bind(travel_time)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// A cached result, only while still live; an expired or absent row
    /// reports `NotFound`.
    pub async fn cached_route(
        &self,
        origin_zip: &str,
        dest_zip: &str,
    ) -> Result<CachedRoute, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT origin_zip, dest_zip, distance, travel_time, calculated_at, expires_at
            FROM cached_routes
            WHERE origin_zip = $1 AND dest_zip = $2 AND expires_at > NOW()
            "#,
        )
        .bind(origin_zip)
        .bind(dest_zip)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        Ok(CachedRoute {
            origin_zip: row.try_get("origin_zip")?,
            dest_zip: row.try_get("dest_zip")?,
            distance: row.try_get("distance")?,
            travel_time: row.try_get("travel_time")?,
            calculated_at: row.try_get("calculated_at")?,
            expires_at: row.try_get("expires_at")?,
        })
    }

    /// Bounded node scan for graph expansion and operator tooling.
    pub async fn nodes_in_bounds(
        &self,
        bounds: Bounds,
        limit: i64,
    ) -> Result<Vec<Node>, StoreError> {
        sqlx::query(
            r#"
            SELECT id, osm_id,
                   ST_X(location::geometry) AS lon,
                   ST_Y(location::geometry) AS lat
            FROM nodes
            WHERE ST_Intersects(location::geometry, ST_MakeEnvelope($1, $2, $3, $4, 4326))
            LIMIT $5
            "#,
        )
        .bind(bounds.min_lon)
        .bind(bounds.min_lat)
        .bind(bounds.max_lon)
        .bind(bounds.max_lat)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(node_from_row)
        .collect()
    }

    /// Bounded adjacency scan from a single node.
    pub async fn outgoing_edges(&self, node_id: i64, limit: i64) -> Result<Vec<Edge>, StoreError> {
        sqlx::query(
            r#"
            SELECT id, from_node_id, to_node_id, distance, travel_time,
                   max_height, max_weight, truck_allowed, road_type, osm_way_id
            FROM edges
            WHERE from_node_id = $1
            LIMIT $2
            "#,
        )
        .bind(node_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(edge_from_row)
        .collect()
    }

    /// Batched node upsert during import; duplicate source identities
    /// are ignored.
    pub async fn insert_node_batch(&self, batch: &[NodeRecord]) -> Result<u64, StoreError> {
        if batch.is_empty() {
            return Ok(0);
        }

        let osm_ids: Vec<i64> = batch.iter().map(|n| n.osm_id).collect();
        let lons: Vec<f64> = batch.iter().map(|n| n.lon).collect();
        let lats: Vec<f64> = batch.iter().map(|n| n.lat).collect();

        let result = sqlx::query(
            r#"
            INSERT INTO nodes (osm_id, location)
            SELECT t.osm_id, ST_SetSRID(ST_MakePoint(t.lon, t.lat), 4326)::geography
            FROM UNNEST($1::bigint[], $2::float8[], $3::float8[]) AS t(osm_id, lon, lat)
            ON CONFLICT (osm_id) DO NOTHING
            "#,
        )
        .bind(&osm_ids)
        .bind(&lons)
        .bind(&lats)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Batched edge insert during import. Source identities resolve to
    /// internal identities through the join; rows whose endpoints did
    /// not resolve drop out of the insert. Returns the resolved count
    /// so the caller can account for the dropped remainder.
    pub async fn insert_edge_batch(&self, batch: &[EdgeRecord]) -> Result<u64, StoreError> {
        if batch.is_empty() {
            return Ok(0);
        }

        let from_ids: Vec<i64> = batch.iter().map(|e| e.from_osm_id).collect();
        let to_ids: Vec<i64> = batch.iter().map(|e| e.to_osm_id).collect();
        let distances: Vec<f64> = batch.iter().map(|e| e.distance).collect();
        let times: Vec<f64> = batch.iter().map(|e| e.travel_time).collect();
        let heights: Vec<f64> = batch.iter().map(|e| e.max_height).collect();
        let weights: Vec<f64> = batch.iter().map(|e| e.max_weight).collect();
        let truck: Vec<bool> = batch.iter().map(|e| e.truck_allowed).collect();
        let road_types: Vec<String> = batch.iter().map(|e| e.road_type.clone()).collect();
        let way_ids: Vec<i64> = batch.iter().map(|e| e.osm_way_id).collect();

        let result = sqlx::query(
            r#"
            INSERT INTO edges (from_node_id, to_node_id, distance, travel_time,
                               max_height, max_weight, truck_allowed, road_type, osm_way_id)
            SELECT n1.id, n2.id, t.distance, t.travel_time,
                   t.max_height, t.max_weight, t.truck_allowed, t.road_type, t.osm_way_id
            FROM UNNEST($1::bigint[], $2::bigint[], $3::float8[], $4::float8[], $5::float8[],
                        $6::float8[], $7::bool[], $8::text[], $9::bigint[])
                 AS t(from_osm_id, to_osm_id, distance, travel_time,
                      max_height, max_weight, truck_allowed, road_type, osm_way_id)
            JOIN nodes n1 ON n1.osm_id = t.from_osm_id
            JOIN nodes n2 ON n2.osm_id = t.to_osm_id
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(&from_ids)
        .bind(&to_ids)
        .bind(&distances)
        .bind(&times)
        .bind(&heights)
        .bind(&weights)
        .bind(&truck)
        .bind(&road_types)
        .bind(&way_ids)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Expires every live cache row whose origin or destination zip
    /// resolves to a node inside `bounds`. Returns the expired count.
    pub async fn expire_cached_routes_in_region(&self, bounds: Bounds) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE cached_routes c SET expires_at = NOW()
            FROM zip_nodes z
            JOIN nodes n ON n.id = z.node_id
            WHERE (c.origin_zip = z.zip_code OR c.dest_zip = z.zip_code)
              AND c.expires_at > NOW()
              AND ST_Intersects(n.location::geometry, ST_MakeEnvelope($1, $2, $3, $4, 4326))
            "#,
        )
        .bind(bounds.min_lon)
        .bind(bounds.min_lat)
        .bind(bounds.max_lon)
        .bind(bounds.max_lat)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Conservative invalidation: expires every live cache row.
    pub async fn expire_all_cached_routes(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("UPDATE cached_routes SET expires_at = NOW() WHERE expires_at > NOW()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

fn node_from_row(row: &PgRow) -> Result<Node, StoreError> {
    Ok(Node::new(
        row.try_get("id")?,
        row.try_get("osm_id")?,
        Point::new(row.try_get("lon")?, row.try_get("lat")?),
    ))
}

fn edge_from_row(row: &PgRow) -> Result<Edge, StoreError> {
    let road_type: String = row.try_get("road_type")?;

    Ok(Edge {
        id: row.try_get("id")?,
        from: row.try_get("from_node_id")?,
        to: row.try_get("to_node_id")?,
        distance: row.try_get("distance")?,
        travel_time: row.try_get("travel_time")?,
        restrictions: Restrictions {
            max_height: row.try_get("max_height")?,
            max_weight: row.try_get("max_weight")?,
            truck_allowed: row.try_get("truck_allowed")?,
        },
        road_class: road_type.parse().unwrap_or(RoadClass::Unclassified),
        osm_way_id: row.try_get("osm_way_id")?,
    })
}
