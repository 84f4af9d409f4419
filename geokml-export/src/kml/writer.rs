//! KML 2.2 serialization

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::{ExtendedData, Folder, Geometry, KmlDocument, Placemark, Style};
use crate::geometry::Coordinate;

pub const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";

type XmlResult = Result<(), quick_xml::Error>;

/// Render the whole document as an indented KML string
pub fn to_kml_string(doc: &KmlDocument) -> Result<String, quick_xml::Error> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new("kml").with_attributes([("xmlns", KML_NAMESPACE)]),
    ))?;
    start(&mut writer, "Document")?;

    if let Some(name) = &doc.name {
        text_element(&mut writer, "name", name)?;
    }
    write_extended_data(&mut writer, &doc.metadata)?;
    for folder in doc.folders() {
        write_folder(&mut writer, folder)?;
    }

    end(&mut writer, "Document")?;
    end(&mut writer, "kml")?;

    // Only &str content is ever written, so the buffer is valid UTF-8
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

fn write_folder(writer: &mut Writer<Vec<u8>>, folder: &Folder) -> XmlResult {
    start(writer, "Folder")?;
    text_element(writer, "name", &folder.name)?;
    for placemark in &folder.placemarks {
        write_placemark(writer, placemark)?;
    }
    end(writer, "Folder")
}

fn write_placemark(writer: &mut Writer<Vec<u8>>, placemark: &Placemark) -> XmlResult {
    start(writer, "Placemark")?;
    text_element(writer, "name", &placemark.name)?;
    if let Some(description) = &placemark.description {
        text_element(writer, "description", description)?;
    }
    if let Some(style) = &placemark.style {
        write_style(writer, style)?;
    }
    write_extended_data(writer, &placemark.extended_data)?;
    write_geometry(writer, &placemark.geometry)?;
    end(writer, "Placemark")
}

fn write_style(writer: &mut Writer<Vec<u8>>, style: &Style) -> XmlResult {
    start(writer, "Style")?;
    if style.line_color.is_some() || style.line_width.is_some() {
        start(writer, "LineStyle")?;
        if let Some(color) = &style.line_color {
            text_element(writer, "color", color)?;
        }
        if let Some(width) = style.line_width {
            text_element(writer, "width", &width.to_string())?;
        }
        end(writer, "LineStyle")?;
    }
    if style.poly_color.is_some() || style.poly_outline.is_some() {
        start(writer, "PolyStyle")?;
        if let Some(color) = &style.poly_color {
            text_element(writer, "color", color)?;
        }
        if let Some(outline) = style.poly_outline {
            text_element(writer, "outline", if outline { "1" } else { "0" })?;
        }
        end(writer, "PolyStyle")?;
    }
    end(writer, "Style")
}

fn write_extended_data(writer: &mut Writer<Vec<u8>>, data: &ExtendedData) -> XmlResult {
    if data.is_empty() {
        return Ok(());
    }
    start(writer, "ExtendedData")?;
    for (name, value) in data {
        writer.write_event(Event::Start(
            BytesStart::new("Data").with_attributes([("name", name.as_str())]),
        ))?;
        text_element(writer, "value", value)?;
        end(writer, "Data")?;
    }
    end(writer, "ExtendedData")
}

fn write_geometry(writer: &mut Writer<Vec<u8>>, geometry: &Geometry) -> XmlResult {
    match geometry {
        Geometry::Point(coord) => {
            start(writer, "Point")?;
            text_element(writer, "coordinates", &format_coordinates(std::slice::from_ref(coord)))?;
            end(writer, "Point")
        }
        Geometry::Polygon { outer, inner } => {
            start(writer, "Polygon")?;
            write_boundary(writer, "outerBoundaryIs", outer)?;
            for ring in inner {
                write_boundary(writer, "innerBoundaryIs", ring)?;
            }
            end(writer, "Polygon")
        }
        Geometry::MultiLineString(parts) => {
            start(writer, "MultiGeometry")?;
            for part in parts {
                start(writer, "LineString")?;
                text_element(writer, "coordinates", &format_coordinates(part))?;
                end(writer, "LineString")?;
            }
            end(writer, "MultiGeometry")
        }
    }
}

fn write_boundary(writer: &mut Writer<Vec<u8>>, tag: &str, ring: &[Coordinate]) -> XmlResult {
    start(writer, tag)?;
    start(writer, "LinearRing")?;
    text_element(writer, "coordinates", &format_coordinates(ring))?;
    end(writer, "LinearRing")?;
    end(writer, tag)
}

/// `lon,lat[,alt]` tuples separated by spaces
pub fn format_coordinates(coords: &[Coordinate]) -> String {
    coords
        .iter()
        .map(|c| match c.alt {
            Some(alt) => format!("{},{},{}", c.lon, c.lat, alt),
            None => format!("{},{}", c.lon, c.lat),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn start(writer: &mut Writer<Vec<u8>>, tag: &str) -> XmlResult {
    writer.write_event(Event::Start(BytesStart::new(tag)))
}

fn end(writer: &mut Writer<Vec<u8>>, tag: &str) -> XmlResult {
    writer.write_event(Event::End(BytesEnd::new(tag)))
}

fn text_element(writer: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> XmlResult {
    start(writer, tag)?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    end(writer, tag)
}
