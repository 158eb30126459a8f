use std::path::{Path, PathBuf};
use tracing::warn;

use crate::analyzers::{
    cumulative_daily, cumulative_dekadal, recent_historic, season_comparison,
    sst_two_year_anomalies, two_year_anomalies, wind_rose, year_anomalies, WindPeriod,
};
use crate::cli::args::{Cli, Commands, ExportArgs, InputArgs, MapMethod, PeriodArgs, PeriodProduct};
use crate::config::{MapCapability, Settings, SettingsUpdate};
use crate::error::{ProcessingError, Result};
use crate::models::{Dekad, Element, Granularity, ObservationTable, PeriodFilter, Season};
use crate::processors::{
    CrossSectionExtractor, LoadResult, PeriodAggregator, RecordNormalizer, StationExtractor,
    StationRegistry,
};
use crate::readers::DataChoice;
use crate::sources::{SstFetch, SstSource};
use crate::spatial::{
    map_surface, station_distribution, AreaSelector, BoundingBoxService, GeometryService, GridCache,
    InverseDistance, KrigingModel,
};
use crate::utils::filename::cross_section_filename;
use crate::utils::progress::ProgressReporter;
use crate::writers::{cross_section_records, CsvExporter};

fn fmt_value(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}

fn settings_file(cli_settings: Option<&Path>) -> Result<PathBuf> {
    match cli_settings {
        Some(path) => Ok(path.to_path_buf()),
        None => Settings::default_settings_file(),
    }
}

/// Existing paths are used as given; anything else is looked up in the data folder.
fn resolve_input(settings: &Settings, input: &Path) -> PathBuf {
    if input.exists() {
        input.to_path_buf()
    } else {
        settings.data_path.join(input)
    }
}

fn csv_exporter(settings: &Settings, export: &ExportArgs) -> Result<Option<CsvExporter>> {
    if !export.export {
        return Ok(None);
    }
    let dir = export.out_dir.clone().unwrap_or_else(|| settings.out_path.clone());
    CsvExporter::new(dir).map(Some)
}

fn load(settings: &Settings, input: &InputArgs, choice: DataChoice) -> Result<LoadResult> {
    let path = resolve_input(settings, &input.input);
    let registry = StationRegistry::new(settings.registry_path()).with_update_all(input.update_all);

    let progress = ProgressReporter::new_spinner(&format!("Reading {}...", path.display()), false);
    let result = RecordNormalizer::new().load(&path, choice, Some(&registry))?;
    progress.finish_with_message(&format!("Loaded {}", path.display()));
    Ok(result)
}

fn load_values(settings: &Settings, input: &InputArgs) -> Result<ObservationTable> {
    match load(settings, input, DataChoice::Values)? {
        LoadResult::Values { table, stats } => {
            if stats.dropped_rows() > 0 || stats.invalid_dates > 0 {
                println!(
                    "Dropped {} raw rows and {} invalid dates while loading",
                    stats.dropped_rows(),
                    stats.invalid_dates
                );
            }
            Ok(table)
        }
        LoadResult::Metadata(_) => Err(ProcessingError::InvalidDataChoice("metadata".to_string())),
    }
}

fn parse_season(season: Option<&str>) -> Result<Option<Season>> {
    season.map(str::parse::<Season>).transpose()
}

fn period_filter(period: &PeriodArgs) -> Result<PeriodFilter> {
    let dekad = period
        .dekad
        .map(|index| {
            Dekad::from_index(index).ok_or_else(|| {
                ProcessingError::InvalidFormat(format!("dekad must be 1, 2 or 3, got {}", index))
            })
        })
        .transpose()?;
    Ok(PeriodFilter {
        season: parse_season(period.season.as_deref())?,
        month: period.month,
        dekad,
    })
}

fn require_year(year: Option<i32>, product: PeriodProduct) -> Result<i32> {
    year.ok_or_else(|| ProcessingError::Config(format!("the {:?} product needs --year", product)))
}

pub fn run(cli: Cli) -> Result<()> {
    let settings_path = settings_file(cli.settings.as_deref())?;
    let mut settings = Settings::load(Some(settings_path.as_path()))?;

    match cli.command {
        Commands::Load { input, choice } => {
            let choice: DataChoice = choice.parse()?;
            match load(&settings, &input, choice)? {
                LoadResult::Values { table, stats } => {
                    println!("Observations: {}", stats.observations);
                    println!("Stations: {}", table.station_names().join(", "));
                    let elements: Vec<&str> = table.elements().iter().map(|e| e.code()).collect();
                    println!("Elements: {}", elements.join(", "));
                    println!(
                        "Dropped: {} invalid dates, {} unparseable year/month rows, {} unknown element rows",
                        stats.invalid_dates, stats.unparseable_periods, stats.unknown_elements
                    );
                    println!(
                        "Missing values: {}, observation hours defaulted to 9:00: {}",
                        stats.missing_values, stats.defaulted_times
                    );
                }
                LoadResult::Metadata(stations) => {
                    println!("{} stations:", stations.len());
                    for station in stations {
                        println!(
                            "  {} ({}) lat {:.4}, lon {:.4}, elevation {}",
                            station.name,
                            station.station_id,
                            station.latitude,
                            station.longitude,
                            fmt_value(station.elevation)
                        );
                    }
                }
            }
        }

        Commands::Station { input, station } => {
            let table = load_values(&settings, &input)?;
            let daily = StationExtractor::new().extract(&table, &station)?;
            if let (Some(first), Some(last)) = (daily.first_date(), daily.last_date()) {
                println!("{}: data from {} until {}", daily.station, first, last);
            }
            println!("{} days, missing data: {}", daily.rows.len(), daily.missing_summary());
        }

        Commands::Period {
            input,
            station,
            element,
            granularity,
            product,
            year,
            season,
            starts,
            export,
        } => {
            let table = load_values(&settings, &input)?;
            let daily = StationExtractor::new().extract(&table, &station)?;
            let aggregator = PeriodAggregator::new();
            let periods = aggregator.aggregate_named(&daily, &element, &granularity)?;
            let exporter = csv_exporter(&settings, &export)?;

            match product {
                PeriodProduct::Table => {
                    println!(
                        "{} {} {} {}: {} periods",
                        periods.meta.station,
                        periods.meta.granularity,
                        periods.meta.long_name(),
                        periods.meta.unit(),
                        periods.rows.len()
                    );
                    for row in periods.rows.iter().filter(|r| year.map_or(true, |y| r.year() == y)) {
                        println!(
                            "  {:<16} {:>10} avg {:>10} std {:>8} completeness {}",
                            row.key.to_string(),
                            fmt_value(row.value),
                            fmt_value(row.average),
                            fmt_value(row.std_dev),
                            fmt_value(row.completeness)
                        );
                    }
                    if let Some(exporter) = exporter {
                        exporter.export(&periods)?;
                    }
                }
                PeriodProduct::YearAnomalies => {
                    let anomalies = year_anomalies(&periods)?;
                    for row in &anomalies.rows {
                        println!("  {} {:>10} anomaly {:>10}", row.year, fmt_value(row.value), fmt_value(row.anomaly));
                    }
                    if let Some(exporter) = exporter {
                        exporter.export(&anomalies)?;
                    }
                }
                PeriodProduct::Season => {
                    let comparison = season_comparison(&periods, require_year(year, product)?)?;
                    for row in &comparison.rows {
                        println!("  {:<7} {:>10} avg {:>10}", row.season, fmt_value(row.value), fmt_value(row.average));
                    }
                    if let Some(exporter) = exporter {
                        exporter.export(&comparison)?;
                    }
                }
                PeriodProduct::Recent => {
                    let recent = recent_historic(&periods, require_year(year, product)?)?;
                    println!("  {} against {}", recent.year, recent.historic_label());
                    for row in &recent.rows {
                        println!(
                            "  {:<8} {:>10} mean {:>10} p5 {:>10} p95 {:>10}",
                            row.label,
                            fmt_value(row.recent),
                            fmt_value(row.historical),
                            fmt_value(row.per5),
                            fmt_value(row.per95)
                        );
                    }
                    if let Some(exporter) = exporter {
                        exporter.export(&recent)?;
                    }
                }
                PeriodProduct::TwoYear => {
                    let anomalies = two_year_anomalies(&periods, &starts)?;
                    println!("{}", anomalies.title);
                    for row in anomalies.csv_rows() {
                        println!("  {}", row.join("\t"));
                    }
                    if let Some(exporter) = exporter {
                        exporter.write_rows(&anomalies.filename, &anomalies.csv_rows())?;
                    }
                }
                PeriodProduct::Cumulative => {
                    let year = require_year(year, product)?;
                    let season = parse_season(season.as_deref())?;
                    let cumulative = match periods.meta.granularity {
                        Granularity::Day => cumulative_daily(&daily, year, season)?,
                        _ => cumulative_dekadal(&periods, year, season)?,
                    };
                    println!("Cumulative rainfall {} at {}", cumulative.label(), cumulative.station);
                    if let Some(last) = cumulative.rows.last() {
                        println!(
                            "  total {} against mean {} (p5 {}, p95 {})",
                            fmt_value(last.cumulative),
                            fmt_value(last.average),
                            fmt_value(last.per5),
                            fmt_value(last.per95)
                        );
                    }
                    if let Some(exporter) = exporter {
                        exporter.export(&cumulative)?;
                    }
                }
            }
        }

        Commands::CrossSection {
            input,
            element,
            period,
            area,
            export,
        } => {
            let table = load_values(&settings, &input)?;
            let element: Element = element.parse()?;
            let section =
                CrossSectionExtractor::new().extract(&table, element, period.year, period_filter(&period)?)?;

            println!("{} {} for {}:", section.meta.long_name(), section.meta.unit(), section.meta.label());
            for row in &section.rows {
                println!(
                    "  {:<20} {:>10} avg {:>10} std {:>8}",
                    row.station,
                    fmt_value(row.value),
                    fmt_value(row.average),
                    fmt_value(row.std_dev)
                );
            }
            if let Some(exporter) = csv_exporter(&settings, &export)? {
                let filename = cross_section_filename(element, &section.meta.label(), &area);
                exporter.write_records(&filename, &cross_section_records(&section))?;
            }
        }

        Commands::Map {
            input,
            element,
            period,
            region,
            zone,
            district,
            method,
            kriging_model,
            distribution,
            export,
        } => {
            let table = load_values(&settings, &input)?;
            let element: Element = element.parse()?;
            let section =
                CrossSectionExtractor::new().extract(&table, element, period.year, period_filter(&period)?)?;
            let registry = StationRegistry::new(settings.registry_path()).lookup()?;
            let exporter = csv_exporter(&settings, &export)?;

            if distribution {
                let stations = station_distribution(&section, &registry);
                println!(
                    "Stations with data for {} in the period {}: {}",
                    element,
                    section.meta.label(),
                    stations.stations.len()
                );
                for station in &stations.stations {
                    println!("  {:<20} lon {:.4} lat {:.4}", station.station, station.longitude, station.latitude);
                }
                if let Some(exporter) = exporter {
                    exporter.export(&stations)?;
                }
                return Ok(());
            }

            if let MapCapability::Disabled { reason } = settings.map_capability() {
                println!("Map abilities disabled ({}); using bounding-box areas instead", reason);
            }
            let selector = AreaSelector {
                region,
                zone,
                district,
            };
            let area = BoundingBoxService::new().area(&selector)?;
            let grid = GridCache::new(settings.grid_dir()).load_or_compute(area.as_ref())?;

            if method == MapMethod::Kriging {
                let model: KrigingModel = kriging_model.parse()?;
                warn!("No kriging solver is linked for the {} model", model);
                println!("Kriging ({}) needs an external solver; using inverse distance weighting", model);
            }
            let surface = map_surface(&section, &registry, area.as_ref(), &grid, &InverseDistance)?;

            println!(
                "{} {} {} over {}: {} stations, {} of {} grid points inside the area",
                surface.method,
                section.meta.long_name(),
                section.meta.label(),
                surface.area,
                surface.stations.len(),
                grid.inside_count(),
                grid.points.len()
            );
            let mut counts: Vec<_> = surface.category_counts().into_iter().collect();
            counts.sort();
            for (category, count) in counts {
                println!("  {:?}: {} grid points", category, count);
            }
            if let Some(exporter) = exporter {
                exporter.write_records(&surface.stations_filename(), &surface.stations)?;
                exporter.export(&surface)?;
            }
        }

        Commands::WindRose {
            input,
            station,
            year,
            month,
            season,
            export,
        } => {
            let table = load_values(&settings, &input)?;
            let period = match (month, parse_season(season.as_deref())?) {
                (Some(month), _) => WindPeriod::Month { year, month },
                (None, Some(season)) => WindPeriod::Season {
                    season_year: year,
                    season,
                },
                (None, None) => WindPeriod::Year(year),
            };
            let rose = wind_rose(&table, &station, period)?;

            println!("Wind rose {} at {} ({} records)", rose.label, rose.station, rose.records);
            println!(
                "  average wind speed {} m/s, direction {}°",
                fmt_value(rose.mean_speed),
                fmt_value(rose.mean_direction)
            );
            println!("  calms {}%, missing {}%", rose.calm_percent, rose.missing_percent);
            if let Some(exporter) = csv_exporter(&settings, &export)? {
                exporter.export(&rose)?;
            }
        }

        Commands::Sst { starts, export } => {
            let fetched = SstSource::new(settings.sst_cache_path()).fetch();
            match &fetched {
                SstFetch::Fresh(records) => println!("SST data downloaded ({} months)", records.len()),
                SstFetch::Cached { reason, .. } => {
                    println!("SST data could not be retrieved online ({}); using cached data", reason)
                }
                SstFetch::Unavailable { reason } => println!("SST data unavailable: {}", reason),
            }
            let records = fetched.into_records()?;
            let anomalies = sst_two_year_anomalies(&records, &starts)?;
            for row in anomalies.csv_rows() {
                println!("  {}", row.join("\t"));
            }
            if let Some(exporter) = csv_exporter(&settings, &export)? {
                exporter.write_rows(&anomalies.filename, &anomalies.csv_rows())?;
            }
        }

        Commands::Settings {
            data_path,
            out_path,
            adm0_path,
            adm1_path,
            adm2_path,
            adm3_path,
        } => {
            let update = SettingsUpdate {
                adm0_path,
                adm1_path,
                adm2_path,
                adm3_path,
                data_path,
                out_path,
            };
            let changed = update_has_changes(&update);
            settings.apply(update);
            settings.init(&settings_path)?;
            if changed {
                settings.save(&settings_path)?;
            }
            println!("{}", serde_json::to_string_pretty(&settings)?);
            if let MapCapability::Disabled { reason } = settings.map_capability() {
                println!("Map abilities disabled: {}", reason);
            }
        }

        Commands::ClearGrid => {
            if GridCache::new(settings.grid_dir()).clear()? {
                println!("Grid data cleared from {}", settings.grid_dir().display());
            } else {
                println!("No grid data to clear");
            }
        }
    }

    Ok(())
}

fn update_has_changes(update: &SettingsUpdate) -> bool {
    [
        &update.adm0_path,
        &update.adm1_path,
        &update.adm2_path,
        &update.adm3_path,
        &update.data_path,
        &update.out_path,
    ]
    .iter()
    .any(|value| value.is_some())
}
